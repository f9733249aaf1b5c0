use crate::progress::store::KvStore;

pub const SOUND_KEY: &str = "palabritas_sound";
pub const NARRATION_KEY: &str = "palabritas_narration";
pub const ZEN_KEY: &str = "palabritas_zen";

/// User toggles, each persisted under its own key as the literal string
/// "true" or "false". A missing key falls back to the default; any stored
/// value other than "true" reads as false.
#[derive(Debug)]
pub struct Preferences<S: KvStore> {
    store: S,
    sound: bool,
    letter_narration: bool,
    zen_mode: bool,
}

impl<S: KvStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        let sound = load_flag(&store, SOUND_KEY, true);
        let letter_narration = load_flag(&store, NARRATION_KEY, false);
        let zen_mode = load_flag(&store, ZEN_KEY, false);
        Self {
            store,
            sound,
            letter_narration,
            zen_mode,
        }
    }

    pub fn sound(&self) -> bool {
        self.sound
    }

    pub fn letter_narration(&self) -> bool {
        self.letter_narration
    }

    pub fn zen_mode(&self) -> bool {
        self.zen_mode
    }

    pub fn toggle_sound(&mut self) {
        self.sound = !self.sound;
        save_flag(&self.store, SOUND_KEY, self.sound);
    }

    pub fn toggle_letter_narration(&mut self) {
        self.letter_narration = !self.letter_narration;
        save_flag(&self.store, NARRATION_KEY, self.letter_narration);
    }

    pub fn toggle_zen_mode(&mut self) {
        self.zen_mode = !self.zen_mode;
        save_flag(&self.store, ZEN_KEY, self.zen_mode);
    }
}

fn load_flag<S: KvStore>(store: &S, key: &str, default: bool) -> bool {
    match store.get(key) {
        Some(value) => value == "true",
        None => default,
    }
}

fn save_flag<S: KvStore>(store: &S, key: &str, value: bool) {
    let _ = store.set(key, if value { "true" } else { "false" });
}
