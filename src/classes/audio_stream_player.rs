//! `AudioStreamPlayer`: non-positional audio playback node.

use crate::bindings::call::{call_0, call_1};
use crate::bindings::callable::Callable;
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::bindings::signal;
use crate::bindings::string_name::StringName;
use crate::classes::{AudioStream, Node};
use crate::core::error::BindingResult;

static SET_STREAM: MethodBind = MethodBind::new("AudioStreamPlayer", "set_stream", 2210767741);
static GET_STREAM: MethodBind = MethodBind::new("AudioStreamPlayer", "get_stream", 160907539);
static SET_VOLUME_DB: MethodBind = MethodBind::new("AudioStreamPlayer", "set_volume_db", 373806689);
static GET_VOLUME_DB: MethodBind =
    MethodBind::new("AudioStreamPlayer", "get_volume_db", 1740695150);
static SET_PITCH_SCALE: MethodBind =
    MethodBind::new("AudioStreamPlayer", "set_pitch_scale", 373806689);
static GET_PITCH_SCALE: MethodBind =
    MethodBind::new("AudioStreamPlayer", "get_pitch_scale", 1740695150);
static SET_AUTOPLAY: MethodBind = MethodBind::new("AudioStreamPlayer", "set_autoplay", 2586408642);
static IS_AUTOPLAY_ENABLED: MethodBind =
    MethodBind::new("AudioStreamPlayer", "is_autoplay_enabled", 36873697);
static SET_STREAM_PAUSED: MethodBind =
    MethodBind::new("AudioStreamPlayer", "set_stream_paused", 2586408642);
static GET_STREAM_PAUSED: MethodBind =
    MethodBind::new("AudioStreamPlayer", "get_stream_paused", 36873697);
static SET_BUS: MethodBind = MethodBind::new("AudioStreamPlayer", "set_bus", 3304788590);
static GET_BUS: MethodBind = MethodBind::new("AudioStreamPlayer", "get_bus", 2002593661);
static SET_MIX_TARGET: MethodBind =
    MethodBind::new("AudioStreamPlayer", "set_mix_target", 2300306138);
static GET_MIX_TARGET: MethodBind =
    MethodBind::new("AudioStreamPlayer", "get_mix_target", 172807476);
static SET_MAX_POLYPHONY: MethodBind =
    MethodBind::new("AudioStreamPlayer", "set_max_polyphony", 1286410249);
static GET_MAX_POLYPHONY: MethodBind =
    MethodBind::new("AudioStreamPlayer", "get_max_polyphony", 3905245786);
static PLAY: MethodBind = MethodBind::new("AudioStreamPlayer", "play", 1958160172);
static SEEK: MethodBind = MethodBind::new("AudioStreamPlayer", "seek", 373806689);
static STOP: MethodBind = MethodBind::new("AudioStreamPlayer", "stop", 3218959716);
static IS_PLAYING: MethodBind = MethodBind::new("AudioStreamPlayer", "is_playing", 36873697);
static GET_PLAYBACK_POSITION: MethodBind =
    MethodBind::new("AudioStreamPlayer", "get_playback_position", 191475506);

pub mod signals {
    use crate::bindings::string_name::StaticName;

    pub static FINISHED: StaticName = StaticName::new("finished");
}

crate::engine_enum! {
    /// 输出声道布局
    pub struct MixTarget {
        STEREO = 0,
        SURROUND = 1,
        CENTER = 2,
    }
}

crate::engine_class! {
    pub struct AudioStreamPlayer : Node {
        methods: [
            "set_stream",
            "get_stream",
            "set_volume_db",
            "get_volume_db",
            "set_pitch_scale",
            "get_pitch_scale",
            "set_autoplay",
            "is_autoplay_enabled",
            "set_stream_paused",
            "get_stream_paused",
            "set_bus",
            "get_bus",
            "set_mix_target",
            "get_mix_target",
            "set_max_polyphony",
            "get_max_polyphony",
            "play",
            "seek",
            "stop",
            "is_playing",
            "get_playback_position",
        ],
        properties: [
            "stream",
            "volume_db",
            "pitch_scale",
            "autoplay",
            "stream_paused",
            "bus",
            "mix_target",
            "max_polyphony",
        ],
        signals: ["finished"],
    }
}

impl AudioStreamPlayer {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    pub fn set_stream(&self, stream: Option<&AudioStream>) {
        call_1(&SET_STREAM, self.handle(), stream)
    }

    pub fn get_stream(&self) -> Option<AudioStream> {
        call_0(&GET_STREAM, self.handle())
    }

    pub fn set_volume_db(&self, volume_db: f32) {
        call_1(&SET_VOLUME_DB, self.handle(), volume_db)
    }

    pub fn get_volume_db(&self) -> f32 {
        call_0(&GET_VOLUME_DB, self.handle())
    }

    pub fn set_pitch_scale(&self, pitch_scale: f32) {
        call_1(&SET_PITCH_SCALE, self.handle(), pitch_scale)
    }

    pub fn get_pitch_scale(&self) -> f32 {
        call_0(&GET_PITCH_SCALE, self.handle())
    }

    pub fn set_autoplay(&self, enable: bool) {
        call_1(&SET_AUTOPLAY, self.handle(), enable)
    }

    pub fn is_autoplay_enabled(&self) -> bool {
        call_0(&IS_AUTOPLAY_ENABLED, self.handle())
    }

    pub fn set_stream_paused(&self, pause: bool) {
        call_1(&SET_STREAM_PAUSED, self.handle(), pause)
    }

    pub fn get_stream_paused(&self) -> bool {
        call_0(&GET_STREAM_PAUSED, self.handle())
    }

    pub fn set_bus(&self, bus: impl Into<StringName>) {
        call_1(&SET_BUS, self.handle(), bus.into())
    }

    pub fn get_bus(&self) -> StringName {
        call_0(&GET_BUS, self.handle())
    }

    pub fn set_mix_target(&self, mix_target: MixTarget) {
        call_1(&SET_MIX_TARGET, self.handle(), mix_target)
    }

    pub fn get_mix_target(&self) -> MixTarget {
        call_0(&GET_MIX_TARGET, self.handle())
    }

    pub fn set_max_polyphony(&self, max_polyphony: i32) {
        call_1(&SET_MAX_POLYPHONY, self.handle(), max_polyphony)
    }

    pub fn get_max_polyphony(&self) -> i32 {
        call_0(&GET_MAX_POLYPHONY, self.handle())
    }

    /// Plays from the start.
    pub fn play(&self) {
        self.play_ex().done()
    }

    pub fn play_ex(&self) -> ExPlay<'_> {
        ExPlay {
            player: self,
            from_position: 0.0,
        }
    }

    pub fn seek(&self, to_position: f32) {
        call_1(&SEEK, self.handle(), to_position)
    }

    pub fn stop(&self) {
        call_0(&STOP, self.handle())
    }

    pub fn is_playing(&self) -> bool {
        call_0(&IS_PLAYING, self.handle())
    }

    /// 播放位置（秒）
    pub fn get_playback_position(&self) -> f32 {
        call_0(&GET_PLAYBACK_POSITION, self.handle())
    }

    pub fn connect_finished(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::FINISHED.get(), move |_: ()| callback())
    }

    pub fn disconnect_finished(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::FINISHED.get(), callable)
    }
}

#[must_use]
pub struct ExPlay<'a> {
    player: &'a AudioStreamPlayer,
    from_position: f32,
}

impl ExPlay<'_> {
    pub fn from_position(mut self, from_position: f32) -> Self {
        self.from_position = from_position;
        self
    }

    pub fn done(self) {
        call_1(&PLAY, self.player.handle(), self.from_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::class_info::EngineClass;
    use crate::bindings::variant::Variant;
    use crate::headless::HeadlessEngine;

    #[test]
    fn test_play_passes_zero_by_default() {
        let engine = HeadlessEngine::install();
        let player = AudioStreamPlayer::new().unwrap();
        let stream = AudioStream::new().unwrap();
        player.set_stream(Some(&stream));

        player.play();
        assert_eq!(
            engine.last_args(player.instance_id(), "play"),
            Some(vec![Variant::Float(0.0)])
        );
        assert!(player.is_playing());

        player.play_ex().from_position(1.5).done();
        assert_eq!(player.get_playback_position(), 1.5);
        player.stop();
        assert!(!player.is_playing());
        assert_eq!(player.get_playback_position(), 0.0);
        player.free();
    }

    #[test]
    fn test_play_without_stream_does_nothing() {
        HeadlessEngine::install();
        let player = AudioStreamPlayer::new().unwrap();
        player.play();
        assert!(!player.is_playing());
        player.free();
    }

    #[test]
    fn test_property_defaults() {
        HeadlessEngine::install();
        let player = AudioStreamPlayer::new().unwrap();
        assert_eq!(player.get_volume_db(), 0.0);
        assert_eq!(player.get_pitch_scale(), 1.0);
        assert_eq!(player.get_bus(), "Master");
        assert_eq!(player.get_mix_target(), MixTarget::STEREO);
        assert_eq!(player.get_max_polyphony(), 1);
        assert!(player.get_stream().is_none());
        player.free();
    }
}
