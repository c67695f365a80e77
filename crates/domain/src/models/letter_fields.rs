//! Per-letter-type field schemas.
//!
//! Field identifiers follow the citizen-facing form (Indonesian) and are
//! serialised in camelCase. Each letter type is one variant of
//! [`LetterFields`], validated by the schema selected from the letter type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::format::format_indonesian_date;
use shared::validation::{validate_clock_time, validate_nik};
use validator::Validate;

use crate::error::{collect_field_errors, FieldError};
use crate::models::LetterType;

/// Sex as printed on Indonesian civil documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "Laki-laki", alias = "L")]
    Male,
    #[serde(rename = "Perempuan", alias = "P")]
    Female,
}

impl Sex {
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Laki-laki",
            Sex::Female => "Perempuan",
        }
    }
}

fn default_nationality() -> String {
    "Indonesia".to_string()
}

/// Identity block of the resident applying for the letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub nama: String,

    #[serde(default)]
    #[validate(custom(function = "validate_nik"))]
    pub nik: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Place of birth is required"))]
    pub tempat_lahir: String,

    #[validate(required(message = "Date of birth is required"))]
    pub tanggal_lahir: Option<NaiveDate>,

    #[validate(required(message = "Sex is required"))]
    pub jenis_kelamin: Option<Sex>,

    #[serde(default)]
    #[validate(length(min = 1, max = 30, message = "Religion is required"))]
    pub agama: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Occupation is required"))]
    pub pekerjaan: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub alamat: String,

    #[validate(length(max = 30, message = "Marital status is too long"))]
    pub status_perkawinan: Option<String>,

    #[serde(default = "default_nationality")]
    #[validate(length(min = 1, max = 50, message = "Nationality is required"))]
    pub kewarganegaraan: String,
}

impl Applicant {
    fn rows(&self) -> Vec<DocumentRow> {
        vec![
            DocumentRow::required("Nama", Some(self.nama.clone())),
            DocumentRow::required("NIK", Some(self.nik.clone())),
            DocumentRow::required("Tempat, Tanggal Lahir", self.birth_line()),
            DocumentRow::required("Jenis Kelamin", self.jenis_kelamin.map(|s| s.label().to_string())),
            DocumentRow::optional("Agama", Some(self.agama.clone())),
            DocumentRow::optional("Status Perkawinan", self.status_perkawinan.clone()),
            DocumentRow::optional("Pekerjaan", Some(self.pekerjaan.clone())),
            DocumentRow::optional("Kewarganegaraan", Some(self.kewarganegaraan.clone())),
            DocumentRow::required("Alamat", Some(self.alamat.clone())),
        ]
    }

    fn birth_line(&self) -> Option<String> {
        let date = self.tanggal_lahir?;
        if self.tempat_lahir.trim().is_empty() {
            return None;
        }
        Some(format!("{}, {}", self.tempat_lahir, format_indonesian_date(date)))
    }
}

/// Fields of a general statement letter (surat keterangan umum).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStatementFields {
    #[serde(flatten)]
    pub pemohon: Applicant,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Purpose is required"))]
    pub keperluan: String,

    #[validate(length(max = 1000, message = "Statement is too long"))]
    pub keterangan: Option<String>,
}

/// Fields of a police clearance referral (surat pengantar SKCK).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PoliceClearanceFields {
    #[serde(flatten)]
    pub pemohon: Applicant,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Purpose is required"))]
    pub keperluan: String,
}

/// Fields of a crowd-gathering permit (surat izin keramaian).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrowdPermitFields {
    #[serde(flatten)]
    pub pemohon: Applicant,

    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Event name is required"))]
    pub nama_acara: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Event kind is required"))]
    pub jenis_acara: String,

    #[validate(required(message = "Event date is required"))]
    pub tanggal_acara: Option<NaiveDate>,

    #[serde(default)]
    #[validate(custom(function = "validate_clock_time"))]
    pub waktu_mulai: String,

    #[validate(custom(function = "validate_clock_time"))]
    pub waktu_selesai: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Venue is required"))]
    pub tempat_acara: String,

    #[validate(range(min = 1, max = 100000, message = "Guest count must be between 1 and 100000"))]
    pub jumlah_undangan: Option<u32>,

    #[validate(length(max = 150, message = "Entertainment description is too long"))]
    pub hiburan: Option<String>,
}

/// Fields of a birth statement (surat keterangan kelahiran).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BirthStatementFields {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Child name is required"))]
    pub nama_bayi: String,

    #[validate(required(message = "Child sex is required"))]
    pub jenis_kelamin_bayi: Option<Sex>,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Place of birth is required"))]
    pub tempat_lahir_bayi: String,

    #[validate(required(message = "Date of birth is required"))]
    pub tanggal_lahir_bayi: Option<NaiveDate>,

    #[validate(custom(function = "validate_clock_time"))]
    pub jam_lahir: Option<String>,

    #[validate(required(message = "Birth order is required"), range(min = 1, max = 20, message = "Birth order must be between 1 and 20"))]
    pub anak_ke: Option<u8>,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Father name is required"))]
    pub nama_ayah: String,

    #[serde(default)]
    #[validate(custom(function = "validate_nik"))]
    pub nik_ayah: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Mother name is required"))]
    pub nama_ibu: String,

    #[serde(default)]
    #[validate(custom(function = "validate_nik"))]
    pub nik_ibu: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub alamat: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Reporter name is required"))]
    pub nama_pelapor: String,

    #[serde(default)]
    #[validate(custom(function = "validate_nik"))]
    pub nik_pelapor: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Reporter relationship is required"))]
    pub hubungan_pelapor: String,
}

/// Fields of a death statement (surat keterangan kematian).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeathStatementFields {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name of the deceased is required"))]
    pub nama_almarhum: String,

    #[serde(default)]
    #[validate(custom(function = "validate_nik"))]
    pub nik_almarhum: String,

    #[validate(required(message = "Sex is required"))]
    pub jenis_kelamin: Option<Sex>,

    pub tanggal_lahir: Option<NaiveDate>,

    #[validate(required(message = "Date of death is required"))]
    pub tanggal_meninggal: Option<NaiveDate>,

    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Place of death is required"))]
    pub tempat_meninggal: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Cause of death is required"))]
    pub sebab_meninggal: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub alamat: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Reporter name is required"))]
    pub nama_pelapor: String,

    #[serde(default)]
    #[validate(custom(function = "validate_nik"))]
    pub nik_pelapor: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Reporter relationship is required"))]
    pub hubungan_pelapor: String,
}

/// A letter-type-specific payload, one variant per [`LetterType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LetterFields {
    GeneralStatement(GeneralStatementFields),
    BirthStatement(BirthStatementFields),
    CrowdPermit(CrowdPermitFields),
    PoliceClearanceReferral(PoliceClearanceFields),
    DeathStatement(DeathStatementFields),
}

/// One numbered line in the body of a rendered letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub label: &'static str,
    pub value: Option<String>,
    /// Rendering refuses to produce a document when a required row is empty.
    pub required: bool,
}

impl DocumentRow {
    fn required(label: &'static str, value: Option<String>) -> Self {
        Self {
            label,
            value: value.filter(|v| !v.trim().is_empty()),
            required: true,
        }
    }

    fn optional(label: &'static str, value: Option<String>) -> Self {
        Self {
            label,
            value: value.filter(|v| !v.trim().is_empty()),
            required: false,
        }
    }
}

fn date_value(date: Option<NaiveDate>) -> Option<String> {
    date.map(format_indonesian_date)
}

impl LetterFields {
    /// Deserializes and validates a submitted payload against the schema of
    /// `letter_type`.
    pub fn parse(letter_type: LetterType, value: serde_json::Value) -> Result<Self, Vec<FieldError>> {
        let fields = Self::from_stored(letter_type, value)
            .map_err(|e| vec![FieldError::new("fields", e.to_string())])?;
        let errors = fields.validation_errors();
        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(errors)
        }
    }

    /// Deserializes a stored payload without re-validating it.
    pub fn from_stored(
        letter_type: LetterType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match letter_type {
            LetterType::GeneralStatement => Self::GeneralStatement(serde_json::from_value(value)?),
            LetterType::BirthStatement => Self::BirthStatement(serde_json::from_value(value)?),
            LetterType::CrowdPermit => Self::CrowdPermit(serde_json::from_value(value)?),
            LetterType::PoliceClearanceReferral => {
                Self::PoliceClearanceReferral(serde_json::from_value(value)?)
            }
            LetterType::DeathStatement => Self::DeathStatement(serde_json::from_value(value)?),
        })
    }

    pub fn letter_type(&self) -> LetterType {
        match self {
            Self::GeneralStatement(_) => LetterType::GeneralStatement,
            Self::BirthStatement(_) => LetterType::BirthStatement,
            Self::CrowdPermit(_) => LetterType::CrowdPermit,
            Self::PoliceClearanceReferral(_) => LetterType::PoliceClearanceReferral,
            Self::DeathStatement(_) => LetterType::DeathStatement,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Plain structs of strings, dates and integers always serialize.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Name of the person the letter is about, used in file names and notices.
    pub fn subject_name(&self) -> &str {
        match self {
            Self::GeneralStatement(f) => &f.pemohon.nama,
            Self::BirthStatement(f) => &f.nama_bayi,
            Self::CrowdPermit(f) => &f.pemohon.nama,
            Self::PoliceClearanceReferral(f) => &f.pemohon.nama,
            Self::DeathStatement(f) => &f.nama_almarhum,
        }
    }

    fn validation_errors(&self) -> Vec<FieldError> {
        let (own, applicant) = match self {
            Self::GeneralStatement(f) => (f.validate(), Some(f.pemohon.validate())),
            Self::BirthStatement(f) => (f.validate(), None),
            Self::CrowdPermit(f) => (f.validate(), Some(f.pemohon.validate())),
            Self::PoliceClearanceReferral(f) => (f.validate(), Some(f.pemohon.validate())),
            Self::DeathStatement(f) => (f.validate(), None),
        };

        let mut errors = Vec::new();
        for result in std::iter::once(own).chain(applicant) {
            if let Err(e) = result {
                errors.extend(collect_field_errors(&e));
            }
        }
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        errors
    }

    /// The numbered body rows printed on the rendered letter.
    pub fn document_rows(&self) -> Vec<DocumentRow> {
        match self {
            Self::GeneralStatement(f) => {
                let mut rows = f.pemohon.rows();
                rows.push(DocumentRow::required("Keperluan", Some(f.keperluan.clone())));
                rows.push(DocumentRow::optional("Keterangan", f.keterangan.clone()));
                rows
            }
            Self::PoliceClearanceReferral(f) => {
                let mut rows = f.pemohon.rows();
                rows.push(DocumentRow::required("Keperluan", Some(f.keperluan.clone())));
                rows
            }
            Self::CrowdPermit(f) => {
                let mut rows = f.pemohon.rows();
                let time = match &f.waktu_selesai {
                    Some(end) => format!("{} - {} WIB", f.waktu_mulai, end),
                    None => format!("{} WIB - selesai", f.waktu_mulai),
                };
                rows.extend([
                    DocumentRow::required("Nama Acara", Some(f.nama_acara.clone())),
                    DocumentRow::required("Jenis Acara", Some(f.jenis_acara.clone())),
                    DocumentRow::required("Hari/Tanggal", date_value(f.tanggal_acara)),
                    DocumentRow::required("Waktu", Some(time)),
                    DocumentRow::required("Tempat", Some(f.tempat_acara.clone())),
                    DocumentRow::optional(
                        "Jumlah Undangan",
                        f.jumlah_undangan.map(|n| format!("{} orang", n)),
                    ),
                    DocumentRow::optional("Hiburan", f.hiburan.clone()),
                ]);
                rows
            }
            Self::BirthStatement(f) => vec![
                DocumentRow::required("Nama Anak", Some(f.nama_bayi.clone())),
                DocumentRow::required(
                    "Jenis Kelamin",
                    f.jenis_kelamin_bayi.map(|s| s.label().to_string()),
                ),
                DocumentRow::required("Tempat Lahir", Some(f.tempat_lahir_bayi.clone())),
                DocumentRow::required("Tanggal Lahir", date_value(f.tanggal_lahir_bayi)),
                DocumentRow::optional("Pukul", f.jam_lahir.as_ref().map(|t| format!("{} WIB", t))),
                DocumentRow::required("Anak Ke", f.anak_ke.map(|n| n.to_string())),
                DocumentRow::required("Nama Ayah", Some(f.nama_ayah.clone())),
                DocumentRow::required("NIK Ayah", Some(f.nik_ayah.clone())),
                DocumentRow::required("Nama Ibu", Some(f.nama_ibu.clone())),
                DocumentRow::required("NIK Ibu", Some(f.nik_ibu.clone())),
                DocumentRow::required("Alamat", Some(f.alamat.clone())),
                DocumentRow::optional("Nama Pelapor", Some(f.nama_pelapor.clone())),
                DocumentRow::optional("NIK Pelapor", Some(f.nik_pelapor.clone())),
                DocumentRow::optional("Hubungan Pelapor", Some(f.hubungan_pelapor.clone())),
            ],
            Self::DeathStatement(f) => vec![
                DocumentRow::required("Nama", Some(f.nama_almarhum.clone())),
                DocumentRow::required("NIK", Some(f.nik_almarhum.clone())),
                DocumentRow::required("Jenis Kelamin", f.jenis_kelamin.map(|s| s.label().to_string())),
                DocumentRow::optional("Tanggal Lahir", date_value(f.tanggal_lahir)),
                DocumentRow::required("Alamat", Some(f.alamat.clone())),
                DocumentRow::required("Meninggal Pada", date_value(f.tanggal_meninggal)),
                DocumentRow::required("Tempat Meninggal", Some(f.tempat_meninggal.clone())),
                DocumentRow::optional("Sebab Meninggal", Some(f.sebab_meninggal.clone())),
                DocumentRow::optional("Nama Pelapor", Some(f.nama_pelapor.clone())),
                DocumentRow::optional("Hubungan Pelapor", Some(f.hubungan_pelapor.clone())),
            ],
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_birth_statement() {
        let fields = LetterFields::parse(LetterType::BirthStatement, birth_json()).unwrap();
        assert_eq!(fields.letter_type(), LetterType::BirthStatement);
        assert_eq!(fields.subject_name(), "Ahmad Fauzi");
        match fields {
            LetterFields::BirthStatement(f) => {
                assert_eq!(f.jenis_kelamin_bayi, Some(Sex::Male));
                assert_eq!(f.anak_ke, Some(2));
            }
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn test_parse_valid_general_statement_flattens_applicant() {
        let fields = LetterFields::parse(LetterType::GeneralStatement, general_json()).unwrap();
        let value = fields.to_value();
        assert_eq!(value["nama"], "Siti Aminah");
        assert_eq!(value["keperluan"], "Persyaratan melamar pekerjaan");
        assert_eq!(value["kewarganegaraan"], "Indonesia");
        assert!(value.get("pemohon").is_none());
    }

    #[test]
    fn test_parse_reports_missing_required_fields() {
        let errors = LetterFields::parse(LetterType::GeneralStatement, json!({})).unwrap_err();
        let names: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        for expected in ["nama", "nik", "tanggalLahir", "jenisKelamin", "alamat", "keperluan"] {
            assert!(names.contains(&expected), "missing error for {}", expected);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_nik() {
        let mut value = birth_json();
        value["nikIbu"] = json!("12345");
        let errors = LetterFields::parse(LetterType::BirthStatement, value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "nikIbu");
        assert_eq!(errors[0].message, "NIK must be exactly 16 digits");
    }

    #[test]
    fn test_parse_rejects_unparseable_date() {
        let mut value = birth_json();
        value["tanggalLahirBayi"] = json!("14/03/2025");
        let errors = LetterFields::parse(LetterType::BirthStatement, value).unwrap_err();
        assert_eq!(errors[0].field, "fields");
    }

    #[test]
    fn test_parse_rejects_bad_event_time() {
        let mut value = applicant_json();
        value["namaAcara"] = json!("Hajatan Pernikahan");
        value["jenisAcara"] = json!("Pernikahan");
        value["tanggalAcara"] = json!("2025-06-01");
        value["waktuMulai"] = json!("25:00");
        value["tempatAcara"] = json!("Rumah pemohon");
        let errors = LetterFields::parse(LetterType::CrowdPermit, value).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "waktuMulai");
    }

    #[test]
    fn test_from_stored_round_trips_birth_statement() {
        let fields = LetterFields::parse(LetterType::BirthStatement, birth_json()).unwrap();
        let restored = LetterFields::from_stored(LetterType::BirthStatement, fields.to_value()).unwrap();
        assert_eq!(fields, restored);
    }

    #[test]
    fn test_document_rows_mark_required_rows() {
        let fields = LetterFields::parse(LetterType::BirthStatement, birth_json()).unwrap();
        let rows = fields.document_rows();
        let child = rows.iter().find(|r| r.label == "Nama Anak").unwrap();
        assert!(child.required);
        assert_eq!(child.value.as_deref(), Some("Ahmad Fauzi"));

        let born = rows.iter().find(|r| r.label == "Tanggal Lahir").unwrap();
        assert_eq!(born.value.as_deref(), Some("14 Maret 2025"));
    }

    #[test]
    fn test_document_rows_blank_optional_values_are_none() {
        let fields = LetterFields::parse(LetterType::GeneralStatement, general_json()).unwrap();
        let rows = fields.document_rows();
        let remark = rows.iter().find(|r| r.label == "Keterangan").unwrap();
        assert!(!remark.required);
        assert!(remark.value.is_none());
    }
}
