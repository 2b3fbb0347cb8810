//! Default preference values shipped with the extension.

use crate::{MemoryPrefs, PREF_ROOT, PrefValue};

/// Layout used when no preferred layout is set.
pub const DEFAULT_LAYOUT: &str = "default";

const DEFAULT_LAYOUT_TABLE: &str = r#"{
  "shch": "щ", "SHCH": "Щ",
  "sh": "ш", "SH": "Ш",
  "ch": "ч", "CH": "Ч",
  "zh": "ж", "ZH": "Ж",
  "yo": "ё", "YO": "Ё",
  "yu": "ю", "YU": "Ю",
  "ya": "я", "YA": "Я",
  "a": "а", "b": "б", "v": "в", "g": "г", "d": "д", "e": "е",
  "z": "з", "i": "и", "j": "й", "k": "к", "l": "л", "m": "м",
  "n": "н", "o": "о", "p": "п", "r": "р", "s": "с", "t": "т",
  "u": "у", "f": "ф", "h": "х", "c": "ц", "y": "ы", "'": "ь",
  "A": "А", "B": "Б", "V": "В", "G": "Г", "D": "Д", "E": "Е",
  "Z": "З", "I": "И", "J": "Й", "K": "К", "L": "Л", "M": "М",
  "N": "Н", "O": "О", "P": "П", "R": "Р", "S": "С", "T": "Т",
  "U": "У", "F": "Ф", "H": "Х", "C": "Ц", "Y": "Ы"
}"#;

/// (name, value) pairs relative to [`PREF_ROOT`].
fn default_values() -> Vec<(&'static str, PrefValue)> {
    vec![
        ("layout", PrefValue::Char(DEFAULT_LAYOUT.to_owned())),
        (
            "layouts.default",
            PrefValue::Unicode(DEFAULT_LAYOUT_TABLE.to_owned()),
        ),
        ("layouts.default.case_sensitive", PrefValue::Bool(false)),
        (
            "commands.fromtranslit.label",
            PrefValue::Unicode("To Cyrillic".to_owned()),
        ),
        (
            "commands.fromtranslit.shortcut",
            PrefValue::Char("control shift VK_Q".to_owned()),
        ),
        (
            "commands.totranslit.label",
            PrefValue::Unicode("To Translit".to_owned()),
        ),
        (
            "commands.totranslit.shortcut",
            PrefValue::Char("control alt shift VK_Q".to_owned()),
        ),
        (
            "commands.togglemode.label",
            PrefValue::Unicode("Cyrillic Mode".to_owned()),
        ),
        (
            "commands.togglemode.shortcut",
            PrefValue::Char("VK_F2".to_owned()),
        ),
        ("prefs_converted", PrefValue::Bool(false)),
    ]
}

/// Registers the shipped defaults under the current namespace.
pub fn register_defaults(prefs: &MemoryPrefs) {
    for (name, value) in default_values() {
        prefs.set_default(&format!("{}{}", PREF_ROOT, name), value);
    }
}
