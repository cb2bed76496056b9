use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const NFSE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CompNfse xmlns="http://www.abrasf.org.br/nfse.xsd">
  <Nfse>
    <InfNfse>
      <Numero>202</Numero>
      <ValoresNfse>
        <BaseCalculo>150.5</BaseCalculo>
      </ValoresNfse>
      <DeclaracaoPrestacaoServico>
        <InfDeclaracaoPrestacaoServico>
          <Servico>
            <Discriminacao>1 CONSULTA CLINICA R$ 150,50</Discriminacao>
          </Servico>
        </InfDeclaracaoPrestacaoServico>
      </DeclaracaoPrestacaoServico>
    </InfNfse>
  </Nfse>
</CompNfse>"#;

const PLAIN_XML: &str = r#"<Nfse>
  <Numero>7</Numero>
  <Valores><BaseCalculo>80</BaseCalculo></Valores>
  <Servico><Discriminacao>EXAME SANGUE</Discriminacao></Servico>
</Nfse>"#;

fn nfse(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nfse").unwrap();
    cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
    cmd
}

fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    fs::write(path, zip_bytes(entries)).unwrap();
}

#[test]
fn test_analyze_prints_table() {
    let dir = TempDir::new().unwrap();
    let xml = dir.path().join("nota.xml");
    fs::write(&xml, NFSE_XML).unwrap();

    nfse(dir.path())
        .arg("analyze")
        .arg(&xml)
        .assert()
        .success()
        .stdout(predicate::str::contains("arquivo"))
        .stdout(predicate::str::contains("nota.xml"))
        .stdout(predicate::str::contains("202"))
        .stdout(predicate::str::contains("150,50"))
        .stdout(predicate::str::contains("CONSULTA CLINICA"));
}

#[test]
fn test_analyze_csv_format() {
    let dir = TempDir::new().unwrap();
    let xml = dir.path().join("nota.xml");
    fs::write(&xml, PLAIN_XML).unwrap();

    nfse(dir.path())
        .args(["analyze", "-f", "csv"])
        .arg(&xml)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("arquivo,numero,valor,tipo_servico"))
        .stdout(predicate::str::contains("nota.xml,7,\"80,00\",EXAME SANGUE"));
}

#[test]
fn test_analyze_expands_zip_archives() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("notas.zip");
    write_zip(
        &archive,
        &[
            ("lote/primeira.xml", NFSE_XML),
            ("lote/segunda.xml", PLAIN_XML),
            ("leiame.txt", "ignored"),
        ],
    );

    nfse(dir.path())
        .args(["analyze", "-f", "json"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"primeira.xml\""))
        .stdout(predicate::str::contains("\"source\": \"segunda.xml\""))
        .stdout(predicate::str::contains("leiame").not())
        .stdout(predicate::str::contains("\"EXAME SANGUE\""));
}

#[test]
fn test_analyze_keeps_corrupt_zip_entries() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("notas.zip");
    let corrupt = "<Nfse><Numero>8</Numero><Discriminacao>EXAME URINA</Discriminacao></Nfse>";
    let mut bytes = zip_bytes(&[("a.xml", PLAIN_XML), ("b.xml", corrupt)]);

    // Entries are stored uncompressed, so the payload can be damaged in place
    let offset = bytes
        .windows(b"URINA".len())
        .position(|window| window == b"URINA")
        .unwrap();
    bytes[offset] = b'X';
    fs::write(&archive, bytes).unwrap();

    nfse(dir.path())
        .args(["analyze", "-f", "csv"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("a.xml,7"))
        .stdout(predicate::str::contains("b.xml,").and(predicate::str::contains("Erro de leitura")))
        .stdout(predicate::str::contains("URINA").not())
        .stderr(predicate::str::contains("Processed 2 documents"))
        .stderr(predicate::str::contains("1 unreadable"));
}

#[test]
fn test_analyze_reports_unreadable_documents() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.xml"), PLAIN_XML).unwrap();
    fs::write(dir.path().join("b.xml"), "<Nfse><Numero>1</Nfse>").unwrap();

    nfse(dir.path())
        .args(["analyze", "-f", "csv"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a.xml,7"))
        .stdout(predicate::str::contains("b.xml,").and(predicate::str::contains("Erro de leitura")))
        .stderr(predicate::str::contains("1 unreadable"));
}

#[test]
fn test_analyze_writes_output_directory() {
    let dir = TempDir::new().unwrap();
    let xml = dir.path().join("nota.xml");
    fs::write(&xml, NFSE_XML).unwrap();
    let out = dir.path().join("saida");

    nfse(dir.path())
        .arg("analyze")
        .arg(&xml)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(out.join("resultados_analise.csv")).unwrap();
    assert!(csv.starts_with("arquivo,numero,valor,tipo_servico"));
    assert!(csv.contains("nota.xml,202,\"150,50\",CONSULTA CLINICA"));

    let pdf = fs::read(out.join("lista_servicos.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}

#[test]
fn test_analyze_writes_service_text() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.xml"), NFSE_XML).unwrap();
    fs::write(dir.path().join("b.xml"), PLAIN_XML).unwrap();
    let list = dir.path().join("servicos.txt");

    nfse(dir.path())
        .args(["analyze", "-f", "json"])
        .arg(dir.path().join("*.xml"))
        .arg("--services-txt")
        .arg(&list)
        .assert()
        .success();

    let content = fs::read_to_string(&list).unwrap();
    assert_eq!(content, "CONSULTA CLINICA\nEXAME SANGUE\n");
}

#[test]
fn test_analyze_fails_without_xml() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("notes.txt"), "nothing here").unwrap();

    nfse(dir.path())
        .arg("analyze")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No XML files found"));
}

#[test]
fn test_services_from_text_file() {
    let dir = TempDir::new().unwrap();
    let text = dir.path().join("relatorio.txt");
    fs::write(
        &text,
        "consulta medica\nConsutla medica.\n\nultra som abdome\nCONSULTA MEDICA\n",
    )
    .unwrap();

    nfse(dir.path())
        .arg("services")
        .arg(&text)
        .assert()
        .success()
        .stdout("CONSULTA MÉDICA\nULTRASSOM ABDOME\n");
}

#[test]
fn test_config_init_and_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    nfse(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    nfse(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.not_found_label", "N/A"])
        .assert()
        .success();

    nfse(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.not_found_label"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"N/A\""));
}

#[test]
fn test_services_from_pdf_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.xml"), NFSE_XML).unwrap();
    fs::write(dir.path().join("b.xml"), PLAIN_XML).unwrap();
    let pdf = dir.path().join("lista.pdf");

    nfse(dir.path())
        .args(["analyze", "-f", "json"])
        .arg(dir.path())
        .arg("--services-pdf")
        .arg(&pdf)
        .assert()
        .success();

    nfse(dir.path())
        .arg("services")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("CONSULTA CLÍNICA"))
        .stdout(predicate::str::contains("EXAME SANGUE"));
}
