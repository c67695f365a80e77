//! Letter types and their document descriptors.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The fixed set of letters a citizen can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterType {
    #[serde(rename = "surat-keterangan-umum", alias = "GeneralStatement")]
    GeneralStatement,
    #[serde(rename = "surat-keterangan-kelahiran", alias = "BirthStatement")]
    BirthStatement,
    #[serde(rename = "surat-izin-keramaian", alias = "CrowdPermit")]
    CrowdPermit,
    #[serde(rename = "surat-pengantar-skck", alias = "PoliceClearanceReferral")]
    PoliceClearanceReferral,
    #[serde(rename = "surat-keterangan-kematian", alias = "DeathStatement")]
    DeathStatement,
}

/// Static per-type document metadata used for routing, storage and rendering.
#[derive(Debug, Clone, Copy)]
pub struct LetterTypeDescriptor {
    pub letter_type: LetterType,
    /// Route segment and stored discriminant.
    pub slug: &'static str,
    /// Human name shown in the admin dashboard.
    pub display_name: &'static str,
    /// Heading printed on the rendered document.
    pub title: &'static str,
    /// Archive classification code that prefixes document numbers.
    pub classification_code: &'static str,
    /// Paragraph printed below the field table.
    pub closing: &'static str,
}

pub const LETTER_TYPES: [LetterTypeDescriptor; 5] = [
    LetterTypeDescriptor {
        letter_type: LetterType::GeneralStatement,
        slug: "surat-keterangan-umum",
        display_name: "Surat Keterangan Umum",
        title: "SURAT KETERANGAN",
        classification_code: "470",
        closing: "Demikian surat keterangan ini dibuat dengan sebenarnya untuk dapat dipergunakan sebagaimana mestinya.",
    },
    LetterTypeDescriptor {
        letter_type: LetterType::BirthStatement,
        slug: "surat-keterangan-kelahiran",
        display_name: "Surat Keterangan Kelahiran",
        title: "SURAT KETERANGAN KELAHIRAN",
        classification_code: "474.1",
        closing: "Demikian surat keterangan kelahiran ini dibuat untuk dapat dipergunakan sebagai dasar penerbitan akta kelahiran.",
    },
    LetterTypeDescriptor {
        letter_type: LetterType::CrowdPermit,
        slug: "surat-izin-keramaian",
        display_name: "Surat Izin Keramaian",
        title: "SURAT KETERANGAN IZIN KERAMAIAN",
        classification_code: "300",
        closing: "Demikian surat keterangan ini dibuat dengan ketentuan pemohon wajib menjaga ketertiban dan keamanan selama acara berlangsung.",
    },
    LetterTypeDescriptor {
        letter_type: LetterType::PoliceClearanceReferral,
        slug: "surat-pengantar-skck",
        display_name: "Surat Pengantar SKCK",
        title: "SURAT PENGANTAR SKCK",
        classification_code: "331",
        closing: "Demikian surat pengantar ini dibuat untuk dapat dipergunakan dalam pengurusan Surat Keterangan Catatan Kepolisian.",
    },
    LetterTypeDescriptor {
        letter_type: LetterType::DeathStatement,
        slug: "surat-keterangan-kematian",
        display_name: "Surat Keterangan Kematian",
        title: "SURAT KETERANGAN KEMATIAN",
        classification_code: "474.3",
        closing: "Demikian surat keterangan kematian ini dibuat dengan sebenarnya untuk dapat dipergunakan sebagaimana mestinya.",
    },
];

impl LetterType {
    pub const ALL: [LetterType; 5] = [
        LetterType::GeneralStatement,
        LetterType::BirthStatement,
        LetterType::CrowdPermit,
        LetterType::PoliceClearanceReferral,
        LetterType::DeathStatement,
    ];

    pub fn descriptor(&self) -> &'static LetterTypeDescriptor {
        // LETTER_TYPES is declared in the same order as ALL
        &LETTER_TYPES[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        self.descriptor().slug
    }
}

impl std::fmt::Display for LetterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a route segment or stored value names no letter type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown letter type: {0}")]
pub struct UnknownLetterType(pub String);

impl FromStr for LetterType {
    type Err = UnknownLetterType;

    /// Accepts the route slug (`surat-keterangan-kelahiran`) or the variant
    /// name (`BirthStatement`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LETTER_TYPES
            .iter()
            .find(|d| d.slug == s || format!("{:?}", d.letter_type) == s)
            .map(|d| d.letter_type)
            .ok_or_else(|| UnknownLetterType(s.to_string()))
    }
}
