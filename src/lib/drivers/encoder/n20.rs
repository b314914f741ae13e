use embedded_hal::Qei;

/// Unwraps a 16-bit hardware quadrature counter into a running position.
///
/// Must be polled at least once per half counter period (32768 counts) or
/// wraps are missed.
pub struct QeiWrapper<X> {
    encoder: X,
    last_count: u16,
    position: i32,
}

impl<X> QeiWrapper<X>
where
    X: Qei<Count = u16>,
{
    pub fn new(qei: X) -> Self {
        let last_count = qei.count();
        Self {
            encoder: qei,
            last_count,
            position: 0,
        }
    }

    /// Accumulated ticks since construction or the last [`Self::zero`].
    pub fn position(&mut self) -> i32 {
        let count = self.encoder.count();
        let delta = count.wrapping_sub(self.last_count) as i16;
        self.last_count = count;
        self.position += delta as i32;
        return self.position;
    }

    pub fn zero(&mut self) {
        self.last_count = self.encoder.count();
        self.position = 0;
    }

    pub fn release(self) -> X {
        self.encoder
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use embedded_hal::Direction;

    use super::*;

    struct Counter<'a>(&'a Cell<u16>);

    impl Qei for Counter<'_> {
        type Count = u16;
        fn count(&self) -> u16 {
            self.0.get()
        }
        fn direction(&self) -> Direction {
            Direction::Upcounting
        }
    }

    #[test]
    fn unwraps_across_the_counter_boundary() {
        let raw = Cell::new(65_530);
        let mut encoder = QeiWrapper::new(Counter(&raw));

        raw.set(4);
        assert_eq!(encoder.position(), 10);

        raw.set(65_526);
        assert_eq!(encoder.position(), -4);
    }

    #[test]
    fn zero_resets_position() {
        let raw = Cell::new(100);
        let mut encoder = QeiWrapper::new(Counter(&raw));
        raw.set(150);
        assert_eq!(encoder.position(), 50);
        encoder.zero();
        assert_eq!(encoder.position(), 0);
    }
}
