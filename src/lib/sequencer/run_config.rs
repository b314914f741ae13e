use crate::field::{Alliance, Lane};
use crate::interfaces::LaneClassifier;

/// Flags picked on the init menu before the match starts.
///
/// Fixed once the run begins; the path is built from it exactly once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub alliance: Alliance,
    pub lane: Lane,
    /// Starting on the tile away from the backdrop.
    pub is_far: bool,
    pub park_in_corner: bool,
    /// Sit on the spike mark while the alliance partner clears the way.
    pub is_stalled: bool,
    pub score_yellow_pixel: bool,
}

impl RunConfig {
    pub fn new(alliance: Alliance, lane: Lane) -> Self {
        RunConfig {
            alliance,
            lane,
            ..RunConfig::default()
        }
    }

    /// Take the lane from a one-shot classifier read.
    pub fn with_lane_from<L: LaneClassifier + ?Sized>(self, classifier: &mut L) -> Self {
        RunConfig {
            lane: classifier.selection(),
            ..self
        }
    }

    /// Scoring the yellow pixel ends at the backdrop, which rules out the
    /// corner park.
    pub fn scoring(mut self, score_yellow_pixel: bool) -> Self {
        self.score_yellow_pixel = score_yellow_pixel;
        if score_yellow_pixel {
            self.park_in_corner = false;
        }
        self
    }

    pub fn far(mut self, is_far: bool) -> Self {
        self.is_far = is_far;
        self
    }

    pub fn stalled(mut self, is_stalled: bool) -> Self {
        self.is_stalled = is_stalled;
        self
    }

    pub fn corner_park(mut self, park_in_corner: bool) -> Self {
        self.park_in_corner = park_in_corner;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Lane);

    impl LaneClassifier for Fixed {
        fn selection(&mut self) -> Lane {
            self.0
        }
    }

    #[test]
    fn defaults_to_blue_middle() {
        let config = RunConfig::default();
        assert_eq!(config.alliance, Alliance::Blue);
        assert_eq!(config.lane, Lane::Middle);
        assert!(!config.is_stalled);
    }

    #[test]
    fn lane_comes_from_classifier() {
        let config = RunConfig::new(Alliance::Red, Lane::Middle).with_lane_from(&mut Fixed(Lane::Left));
        assert_eq!(config.lane, Lane::Left);
        assert_eq!(config.alliance, Alliance::Red);
    }

    #[test]
    fn scoring_clears_corner_park() {
        let config = RunConfig::default().corner_park(true).scoring(true);
        assert!(config.score_yellow_pixel);
        assert!(!config.park_in_corner);

        let config = RunConfig::default().corner_park(true).scoring(false);
        assert!(config.park_in_corner);
    }
}
