use thiserror::Error;

use super::texture::Texture;

pub const STILL_FPS: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    #[error("animation needs at least one frame")]
    NoFrames,
    #[error("animation fps must be a positive finite number, got {fps}")]
    InvalidFps { fps: f32 },
}

/// What changed during one [`Animation::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationStep {
    pub previous_frame: usize,
    pub frame: usize,
    /// Completed cycles since the previous update. Only counted while playing.
    pub loops: u32,
}

impl AnimationStep {
    pub fn frame_changed(&self) -> bool {
        self.frame != self.previous_frame
    }

    pub fn looped(&self) -> bool {
        self.loops > 0
    }

    pub fn is_quiet(&self) -> bool {
        !self.frame_changed() && !self.looped()
    }
}

/// An ordered, non-empty list of frames played back at a fixed rate.
///
/// The current frame is derived from accumulated playtime as
/// `floor(playtime * fps) mod frame_count`, normalized so negative playtime
/// still maps into `[0, frame_count)`.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<Texture>,
    fps: f32,
    playing: bool,
    playtime: f64,
    last_frame: usize,
    last_cycle: i64,
}

impl Animation {
    pub fn new(frames: Vec<Texture>, fps: f32) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::NoFrames);
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(AnimationError::InvalidFps { fps });
        }
        Ok(Self {
            frames,
            fps,
            playing: false,
            playtime: 0.0,
            last_frame: 0,
            last_cycle: 0,
        })
    }

    pub fn still(texture: Texture) -> Self {
        Self {
            frames: vec![texture],
            fps: STILL_FPS,
            playing: false,
            playtime: 0.0,
            last_frame: 0,
            last_cycle: 0,
        }
    }

    pub fn frames(&self) -> &[Texture] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_duration(&self) -> f32 {
        1.0 / self.fps
    }

    pub fn playtime(&self) -> f64 {
        self.playtime
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn current_frame(&self) -> usize {
        self.split_position().0
    }

    pub fn current_texture(&self) -> &Texture {
        &self.frames[self.current_frame()]
    }

    /// Advances playtime when playing and reports frame changes and loops
    /// relative to the previous update.
    pub fn update(&mut self, dt: f32) -> AnimationStep {
        if self.playing {
            self.playtime += f64::from(dt);
        }

        let (frame, cycle) = self.split_position();
        let loops = if self.playing && cycle > self.last_cycle {
            u32::try_from(cycle - self.last_cycle).unwrap_or(u32::MAX)
        } else {
            0
        };

        let step = AnimationStep {
            previous_frame: self.last_frame,
            frame,
            loops,
        };
        self.last_frame = frame;
        self.last_cycle = cycle;
        step
    }

    /// Moves one frame forward. Notifications are reported by the next update.
    pub fn next_frame(&mut self) {
        self.playtime += 1.0 / f64::from(self.fps);
    }

    /// Moves one frame back. Playtime may become negative.
    pub fn previous_frame(&mut self) {
        self.playtime -= 1.0 / f64::from(self.fps);
    }

    pub fn restart(&mut self) {
        self.playtime = 0.0;
    }

    fn split_position(&self) -> (usize, i64) {
        let frame_count = self.frames.len() as i64;
        let position = (self.playtime * f64::from(self.fps)).floor();
        let position = if position.is_finite() {
            position as i64
        } else {
            0
        };
        (
            position.rem_euclid(frame_count) as usize,
            position.div_euclid(frame_count),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: usize) -> Vec<Texture> {
        (0..count)
            .map(|index| Texture::new(format!("frame_{index}"), 8, 8).expect("texture"))
            .collect()
    }

    #[test]
    fn rejects_empty_frames_and_bad_fps() {
        assert_eq!(
            Animation::new(Vec::new(), 2.0).err(),
            Some(AnimationError::NoFrames)
        );
        assert!(matches!(
            Animation::new(frames(2), 0.0),
            Err(AnimationError::InvalidFps { .. })
        ));
        assert!(matches!(
            Animation::new(frames(2), -3.0),
            Err(AnimationError::InvalidFps { .. })
        ));
        assert!(matches!(
            Animation::new(frames(2), f32::NAN),
            Err(AnimationError::InvalidFps { .. })
        ));
    }

    #[test]
    fn frame_changes_at_fps_boundaries() {
        let mut animation = Animation::new(frames(3), 2.0).expect("animation");
        animation.play();
        assert_eq!(animation.current_frame(), 0);

        let step = animation.update(0.4);
        assert_eq!(step.frame, 0);
        assert!(step.is_quiet());
        assert_eq!(animation.current_texture().key(), "frame_0");

        let step = animation.update(0.2);
        assert_eq!(step.frame, 1);
        assert!(step.frame_changed());
        assert!(!step.looped());
        assert_eq!(animation.current_texture().key(), "frame_1");
    }

    #[test]
    fn full_cycle_returns_to_start_and_loops_once() {
        let mut animation = Animation::new(frames(3), 4.0).expect("animation");
        animation.play();

        let mut loops = 0;
        for _ in 0..6 {
            loops += animation.update(0.125).loops;
        }
        assert_eq!(animation.current_frame(), 0);
        assert_eq!(loops, 1);

        for _ in 0..6 {
            loops += animation.update(0.125).loops;
        }
        assert_eq!(loops, 2);
    }

    #[test]
    fn single_update_spanning_a_cycle_still_reports_the_loop() {
        let mut animation = Animation::new(frames(3), 2.0).expect("animation");
        animation.play();
        let step = animation.update(1.5);
        assert_eq!(step.frame, 0);
        assert!(!step.frame_changed());
        assert_eq!(step.loops, 1);
    }

    #[test]
    fn paused_animation_does_not_advance_or_notify() {
        let mut animation = Animation::new(frames(3), 2.0).expect("animation");
        for _ in 0..10 {
            assert!(animation.update(0.5).is_quiet());
        }
        assert_eq!(animation.playtime(), 0.0);
    }

    #[test]
    fn stepping_backwards_wraps_to_last_frame() {
        let mut animation = Animation::new(frames(3), 3.0).expect("animation");
        animation.previous_frame();
        assert!(animation.playtime() < 0.0);
        assert_eq!(animation.current_frame(), 2);
        animation.previous_frame();
        animation.previous_frame();
        assert_eq!(animation.current_frame(), 0);
        animation.previous_frame();
        assert_eq!(animation.current_frame(), 2);
    }

    #[test]
    fn frame_index_floors_near_boundaries() {
        let mut animation = Animation::new(frames(3), 1.0).expect("animation");
        animation.play();
        animation.update(0.99995);
        assert_eq!(animation.current_frame(), 0);

        animation.restart();
        animation.update(-0.00005);
        assert_eq!(animation.current_frame(), 2);
    }

    #[test]
    fn manual_steps_are_reported_by_the_next_update() {
        let mut animation = Animation::new(frames(3), 2.0).expect("animation");
        animation.next_frame();
        assert_eq!(animation.current_frame(), 1);

        let step = animation.update(0.0);
        assert_eq!(step.previous_frame, 0);
        assert_eq!(step.frame, 1);
        assert!(!step.looped());
    }

    #[test]
    fn frame_index_stays_in_range_for_any_playtime() {
        for frame_count in 1..5 {
            let mut animation = Animation::new(frames(frame_count), 7.0).expect("animation");
            animation.play();
            for dt in [-3.7, -0.01, 0.0, 0.013, 1.9, 250.5, -1000.25] {
                animation.update(dt);
                assert!(animation.current_frame() < frame_count);
            }
        }
    }

    #[test]
    fn restart_zeroes_time_and_keeps_play_state() {
        let mut animation = Animation::new(frames(2), 2.0).expect("animation");
        animation.play();
        animation.update(0.75);
        animation.restart();
        assert_eq!(animation.playtime(), 0.0);
        assert!(animation.is_playing());
        assert_eq!(animation.current_frame(), 0);
    }
}
