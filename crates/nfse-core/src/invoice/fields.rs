//! Known field names and path hypotheses for NFS-e layouts.
//!
//! Paths are relative to the document root and listed shallow to deep, from
//! the bare tag up to the longest container chain seen in the wild (ABRASF
//! 1.x `CompNfse`, query responses wrapping `ListaNfse`, and the 2.x
//! `DeclaracaoPrestacaoServico` layout).

use lazy_static::lazy_static;

use crate::xml::FieldQuery;

pub const NUMBER_FIELD: &str = "Numero";
pub const VALUE_FIELD: &str = "BaseCalculo";
pub const DESCRIPTION_FIELD: &str = "Discriminacao";

/// Grouping elements that hold the value somewhere below them.
pub const VALUE_CONTAINERS: &[&str] = &["ValoresNfse", "Valores"];

pub const NUMBER_PATHS: &[&str] = &[
    "Numero",
    "InfNfse/Numero",
    "Nfse/InfNfse/Numero",
    "CompNfse/Nfse/InfNfse/Numero",
    "ListaNfse/CompNfse/Nfse/InfNfse/Numero",
];

pub const VALUE_PATHS: &[&str] = &[
    "BaseCalculo",
    "Valores/BaseCalculo",
    "ValoresNfse/BaseCalculo",
    "Servico/Valores/BaseCalculo",
    "InfNfse/ValoresNfse/BaseCalculo",
    "InfNfse/Servico/Valores/BaseCalculo",
    "Nfse/InfNfse/ValoresNfse/BaseCalculo",
    "Nfse/InfNfse/Servico/Valores/BaseCalculo",
    "CompNfse/Nfse/InfNfse/Servico/Valores/BaseCalculo",
    "ListaNfse/CompNfse/Nfse/InfNfse/Servico/Valores/BaseCalculo",
];

pub const DESCRIPTION_PATHS: &[&str] = &[
    "Discriminacao",
    "Servico/Discriminacao",
    "InfNfse/Servico/Discriminacao",
    "Nfse/InfNfse/Servico/Discriminacao",
    "CompNfse/Nfse/InfNfse/Servico/Discriminacao",
    "InfDeclaracaoPrestacaoServico/Servico/Discriminacao",
    "Nfse/InfNfse/DeclaracaoPrestacaoServico/InfDeclaracaoPrestacaoServico/Servico/Discriminacao",
    "ListaNfse/CompNfse/Nfse/InfNfse/Servico/Discriminacao",
];

lazy_static! {
    pub static ref NUMBER_QUERY: FieldQuery = FieldQuery::new(NUMBER_FIELD, NUMBER_PATHS);
    pub static ref VALUE_QUERY: FieldQuery = FieldQuery::new(VALUE_FIELD, VALUE_PATHS);
    pub static ref DESCRIPTION_QUERY: FieldQuery =
        FieldQuery::new(DESCRIPTION_FIELD, DESCRIPTION_PATHS);
}
