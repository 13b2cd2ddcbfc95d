//! Per-jurisdiction alleged-violation catalogs

use crate::config::Locale;
use serde::Serialize;

/// Catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Stable identifier stored in the record
    pub id: &'static str,
    /// Display text in the jurisdiction's language
    pub text: &'static str,
}

const fn v(id: &'static str, text: &'static str) -> Violation {
    Violation { id, text }
}

/// United Kingdom
pub const UK_VIOLATIONS: &[Violation] = &[
    v("uk_1", "Failed to give way"),
    v("uk_2", "Exceeding speed limit"),
    v("uk_3", "Improper lane change"),
    v("uk_4", "Following too closely"),
    v("uk_5", "Disregarded traffic signal"),
];

/// California
pub const CALIFORNIA_VIOLATIONS: &[Violation] = &[
    v("ca_1", "Unsafe lane change (CVC 22107)"),
    v("ca_2", "Speeding (CVC 22350)"),
    v("ca_3", "Failure to yield (CVC 21800)"),
    v("ca_4", "Following too closely (CVC 21703)"),
    v("ca_5", "Disobeyed traffic signal (CVC 21453)"),
];

/// New York
pub const NEW_YORK_VIOLATIONS: &[Violation] = &[
    v("ny_1", "Imprudent speed (VTL 1180)"),
    v("ny_2", "Following too closely (VTL 1129)"),
    v("ny_3", "Failed to yield right-of-way (VTL 1140)"),
    v("ny_4", "Unsafe lane change (VTL 1128)"),
    v("ny_5", "Disobeyed traffic control device (VTL 1110)"),
];

/// Turkey
pub const TURKISH_VIOLATIONS: &[Violation] = &[
    v("tr_1", "Kırmızı ışık ihlali"),
    v("tr_2", "Hız limitini aşma"),
    v("tr_3", "Geçiş önceliğine uymama"),
    v("tr_4", "Hatalı şerit değiştirme"),
    v("tr_5", "Yakın takip"),
];

/// Catalog for `locale`
#[inline]
#[must_use]
pub fn catalog(locale: Locale) -> &'static [Violation] {
    match locale {
        Locale::Uk => UK_VIOLATIONS,
        Locale::Ca => CALIFORNIA_VIOLATIONS,
        Locale::Ny => NEW_YORK_VIOLATIONS,
        Locale::Tr => TURKISH_VIOLATIONS,
    }
}

/// Find an entry by id within `locale`
#[must_use]
pub fn lookup(locale: Locale, id: &str) -> Option<&'static Violation> {
    catalog(locale).iter().find(|entry| entry.id == id)
}

/// Whether `id` belongs to the catalog of `locale`
#[inline]
#[must_use]
pub fn is_known(locale: Locale, id: &str) -> bool {
    lookup(locale, id).is_some()
}
