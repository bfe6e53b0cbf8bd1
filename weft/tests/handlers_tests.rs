use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use weft::handlers::*;

#[test]
fn test_parse_roster_line_simple() {
    let entity = parse_roster_line("Acme Corp,https://acme.test").unwrap();
    assert_eq!(entity.name, "Acme Corp");
    assert_eq!(entity.seed_url, "https://acme.test");
}

#[test]
fn test_parse_roster_line_trims_fields() {
    let entity = parse_roster_line("  Acme Corp ,  acme.test  ").unwrap();
    assert_eq!(entity.name, "Acme Corp");
    assert_eq!(entity.seed_url, "acme.test");
}

#[test]
fn test_parse_roster_line_url_may_contain_commas() {
    // Only the first comma splits; the URL keeps the rest.
    let entity = parse_roster_line("Acme,https://acme.test/search?q=a,b").unwrap();
    assert_eq!(entity.seed_url, "https://acme.test/search?q=a,b");
}

#[test]
fn test_parse_roster_line_blank_url_is_kept() {
    // A named row with no URL still reaches the orchestrator, which records
    // it as a failed entity rather than silently dropping it.
    let entity = parse_roster_line("Acme,").unwrap();
    assert_eq!(entity.name, "Acme");
    assert_eq!(entity.seed_url, "");
}

#[test]
fn test_parse_roster_line_rejects_unusable_rows() {
    assert!(parse_roster_line("").is_none());
    assert!(parse_roster_line("   ").is_none());
    assert!(parse_roster_line("# a comment").is_none());
    assert!(parse_roster_line("no comma here").is_none());
    assert!(parse_roster_line(",https://nameless.test").is_none());
}

#[test]
fn test_load_entities_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "# roster")?;
    writeln!(temp_file, "Acme Corp,https://acme.test")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "Globex,globex.test")?;
    writeln!(temp_file, "Initech,")?;

    let path = PathBuf::from(temp_file.path());
    let entities = load_entities_from_file(&path)?;

    assert_eq!(entities.len(), 3);
    assert_eq!(entities[0].name, "Acme Corp");
    assert_eq!(entities[1].seed_url, "globex.test");
    assert_eq!(entities[2].name, "Initech");
    assert_eq!(entities[2].seed_url, "");

    Ok(())
}

#[test]
fn test_load_entities_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();
    writeln!(temp_file, "# only comments").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_entities_from_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No usable entries"));
}

#[test]
fn test_load_entities_from_source_single_pair() {
    let name = "Acme".to_string();
    let url = "https://acme.test".to_string();
    let entities = load_entities_from_source(Some(&name), Some(&url), None).unwrap();

    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].name, "Acme");
    assert_eq!(entities[0].seed_url, "https://acme.test");
}

#[test]
fn test_load_entities_from_source_no_input() {
    let result = load_entities_from_source(None, None, None);
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .contains("Either --roster or --name/--url must be provided")
    );
}
