//! Known sort languages and their collator configuration.
//!
//! Every index declares the ISO code of the language its entries are sorted
//! by. The engine resolves the code against this table to obtain a BCP-47
//! locale and the collation strength comparisons run at; an unknown code is
//! an unsupported-language error. Collators are built with ICU4X.

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};
use icu_locale::Locale;
use log::debug;

use crate::{DictError, Result};

/// A language the engine can sort by.
///
/// The strength is a property of the language configuration, not of call
/// sites: all comparisons through [`Language::collator`] use it.
#[derive(Debug)]
pub struct Language {
    iso_code: &'static str,
    locale: &'static str,
    strength: Strength,
}

const T: Strength = Strength::Tertiary;

static LANGUAGES: &[Language] = &[
    Language { iso_code: "AF", locale: "af", strength: T },
    Language { iso_code: "AR", locale: "ar", strength: T },
    Language { iso_code: "BG", locale: "bg", strength: T },
    Language { iso_code: "CA", locale: "ca", strength: T },
    Language { iso_code: "CMN", locale: "zh", strength: T },
    Language { iso_code: "CS", locale: "cs", strength: T },
    Language { iso_code: "CY", locale: "cy", strength: T },
    Language { iso_code: "DA", locale: "da", strength: T },
    Language { iso_code: "DE", locale: "de", strength: T },
    Language { iso_code: "EL", locale: "el", strength: T },
    Language { iso_code: "EN", locale: "en", strength: T },
    Language { iso_code: "EO", locale: "eo", strength: T },
    Language { iso_code: "ES", locale: "es", strength: T },
    Language { iso_code: "ET", locale: "et", strength: T },
    Language { iso_code: "FA", locale: "fa", strength: T },
    Language { iso_code: "FI", locale: "fi", strength: T },
    Language { iso_code: "FR", locale: "fr", strength: T },
    Language { iso_code: "HE", locale: "he", strength: T },
    Language { iso_code: "HI", locale: "hi", strength: T },
    Language { iso_code: "HR", locale: "hr", strength: T },
    Language { iso_code: "HU", locale: "hu", strength: T },
    Language { iso_code: "ID", locale: "id", strength: T },
    Language { iso_code: "IS", locale: "is", strength: T },
    Language { iso_code: "IT", locale: "it", strength: T },
    Language { iso_code: "JA", locale: "ja", strength: T },
    Language { iso_code: "KO", locale: "ko", strength: T },
    Language { iso_code: "LA", locale: "la", strength: T },
    Language { iso_code: "LT", locale: "lt", strength: T },
    Language { iso_code: "LV", locale: "lv", strength: T },
    Language { iso_code: "NL", locale: "nl", strength: T },
    Language { iso_code: "NO", locale: "no", strength: T },
    Language { iso_code: "PL", locale: "pl", strength: T },
    Language { iso_code: "PT", locale: "pt", strength: T },
    Language { iso_code: "RO", locale: "ro", strength: T },
    Language { iso_code: "RU", locale: "ru", strength: T },
    Language { iso_code: "SK", locale: "sk", strength: T },
    Language { iso_code: "SL", locale: "sl", strength: T },
    Language { iso_code: "SR", locale: "sr", strength: T },
    Language { iso_code: "SV", locale: "sv", strength: T },
    Language { iso_code: "TH", locale: "th", strength: T },
    Language { iso_code: "TR", locale: "tr", strength: T },
    Language { iso_code: "UK", locale: "uk", strength: T },
    Language { iso_code: "VI", locale: "vi", strength: T },
    Language { iso_code: "YUE", locale: "yue", strength: T },
    Language { iso_code: "ZH", locale: "zh", strength: T },
];

impl Language {
    /// Looks up a language by its ISO code, case-insensitively.
    pub fn lookup(iso_code: &str) -> Option<&'static Language> {
        LANGUAGES
            .iter()
            .find(|l| l.iso_code.eq_ignore_ascii_case(iso_code))
    }

    pub fn iso_code(&self) -> &'static str {
        self.iso_code
    }

    pub fn locale_str(&self) -> &'static str {
        self.locale
    }

    pub fn strength(&self) -> Strength {
        self.strength
    }

    /// Builds the collator used for this language's index comparisons.
    pub fn collator(&self) -> Result<CollatorBorrowed<'static>> {
        debug!("creating collator for locale {}", self.locale);
        let locale: Locale = self.locale.parse().map_err(|e| {
            DictError::unsupported_language(format!("{} ({:?})", self.iso_code, e))
        })?;
        let prefs = CollatorPreferences::from(&locale);
        let mut options = CollatorOptions::default();
        options.strength = Some(self.strength);
        Collator::try_new(prefs, options).map_err(|e| {
            DictError::unsupported_language(format!("{} ({:?})", self.iso_code, e))
        })
    }
}
