use pacal_core::data::catalog::ProfileCatalog;
use pacal_core::{FilamentProfile, ProfileError};

#[test]
fn test_builtin_catalog() {
    let catalog = ProfileCatalog::builtin();
    assert_eq!(catalog.printers.len(), 2);
    assert_eq!(catalog.filaments.len(), 2);
    assert!(catalog.validate().is_ok());
}

#[test]
fn test_lookup_is_case_insensitive() {
    let catalog = ProfileCatalog::builtin();
    assert_eq!(catalog.printer("hevo").unwrap().name, "HEvo");
    assert_eq!(catalog.filament("petg").unwrap().name(), "PETG");
}

#[test]
fn test_lookup_unknown() {
    let catalog = ProfileCatalog::builtin();
    let err = catalog.printer("Voron").unwrap_err();
    assert_eq!(
        err,
        ProfileError::NotFound {
            kind: "printer".to_string(),
            name: "Voron".to_string(),
        }
    );
}

#[test]
fn test_duplicate_names_rejected() {
    let mut catalog = ProfileCatalog::builtin();
    catalog
        .filaments
        .push(FilamentProfile::new("pla", 2.85, 100.0, 1.24, 60, 60, 200, 200, 0.0, 0.0));
    assert!(matches!(
        catalog.validate(),
        Err(ProfileError::Duplicate { .. })
    ));
}

#[test]
fn test_empty_catalog_rejected() {
    let mut catalog = ProfileCatalog::builtin();
    catalog.printers.clear();
    assert!(matches!(catalog.validate(), Err(ProfileError::Empty { .. })));
}
