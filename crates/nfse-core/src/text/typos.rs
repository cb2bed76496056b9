//! Spelling corrections for service descriptions.
//!
//! PDF text extraction and typesetting produce the same misspellings of a
//! handful of domain terms over and over. Rules run on upper-cased text, in
//! declared order, each one on the output of the previous, so a rule may
//! rely on an earlier one (`CONSULTAMEDICA` is split first, then `MEDICA`
//! gets its accent). Corrected text must come out of a second pass
//! unchanged, which keeps normalization idempotent.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

/// Built-in rules: (pattern, canonical replacement).
pub const BUILTIN_RULES: &[(&str, &str)] = &[
    // Split and garbled words
    (r"\bCO[NM]?SU[LT]{1,2}A\b", "CONSULTA"),
    (r"\bCONSULTAMEDICA\b", "CONSULTA MEDICA"),
    (r"\bULTRA\s*-?\s*SOM\b", "ULTRASSOM"),
    (r"\bULTRASSO\b", "ULTRASSOM"),
    (r"\bRAIO\s*-?\s*X\b", "RAIO-X"),
    (r"\bELETROCARDIOGRAM\b", "ELETROCARDIOGRAMA"),
    (r"\bHEMOGRAM\b", "HEMOGRAMA"),
    // Missing accents
    (r"\bSERVICOS\b", "SERVIÇOS"),
    (r"\bSERVICO\b", "SERVIÇO"),
    (r"\bODONTOLOGICO\b", "ODONTOLÓGICO"),
    (r"\bODONTOLOGICA\b", "ODONTOLÓGICA"),
    (r"\bORTODONTICO\b", "ORTODÔNTICO"),
    (r"\bENDODONTICO\b", "ENDODÔNTICO"),
    (r"\bMEDICO\b", "MÉDICO"),
    (r"\bMEDICA\b", "MÉDICA"),
    (r"\bCLINICO\b", "CLÍNICO"),
    (r"\bCLINICA\b", "CLÍNICA"),
    (r"\bLABORATORIO\b", "LABORATÓRIO"),
    (r"\bDIAGNOSTICO\b", "DIAGNÓSTICO"),
    (r"\bCIRURGICO\b", "CIRÚRGICO"),
    (r"\bPSICOLOGICO\b", "PSICOLÓGICO"),
    (r"\bPSICOLOGICA\b", "PSICOLÓGICA"),
    (r"\bPERIODICO\b", "PERIÓDICO"),
    (r"\bAVALIACAO\b", "AVALIAÇÃO"),
    (r"\bSESSAO\b", "SESSÃO"),
    (r"\bRESSONANCIA\b", "RESSONÂNCIA"),
    (r"\bMAGNETICA\b", "MAGNÉTICA"),
    (r"\bURGENCIA\b", "URGÊNCIA"),
    (r"\bEMERGENCIA\b", "EMERGÊNCIA"),
];

lazy_static! {
    static ref BUILTIN: TypoTable = TypoTable::from_pairs(BUILTIN_RULES)
        .expect("built-in typo rules are valid regexes");
}

/// A single pattern → replacement correction.
#[derive(Debug, Clone)]
pub struct TypoRule {
    pattern: Regex,
    replacement: String,
}

impl TypoRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Apply to `text`; the replacement is inserted literally.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern
            .replace_all(text, regex::NoExpand(self.replacement.as_str()))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

/// Ordered list of typo rules.
#[derive(Debug, Clone, Default)]
pub struct TypoTable {
    rules: Vec<TypoRule>,
}

impl TypoTable {
    pub fn new(rules: Vec<TypoRule>) -> Self {
        Self { rules }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let rules = pairs
            .iter()
            .map(|(pattern, replacement)| TypoRule::new(pattern, *replacement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    /// The compiled built-in table, shared for the whole process.
    pub fn builtin() -> &'static TypoTable {
        &BUILTIN
    }

    /// Run every rule in order over `text`.
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| match rule.apply(&acc) {
                Cow::Borrowed(_) => acc,
                Cow::Owned(rewritten) => rewritten,
            })
    }

    pub fn rules(&self) -> &[TypoRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
