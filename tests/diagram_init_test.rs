//! Renderer settings are applied once per process.
//!
//! Kept in its own test binary with a single test so no other test can
//! initialize the settings first.

use brain::diagram::{self, DiagramConfig, DiagramTheme, SecurityLevel};

#[test]
fn test_first_initialize_wins() {
    assert!(!diagram::is_initialized());

    let custom = DiagramConfig::default()
        .with_theme(DiagramTheme::Neutral)
        .with_security_level(SecurityLevel::Sandbox)
        .with_font_family("Inter");

    assert!(diagram::initialize(custom.clone()));
    assert!(diagram::is_initialized());
    assert_eq!(diagram::config(), &custom);

    assert!(!diagram::initialize(
        DiagramConfig::default().with_theme(DiagramTheme::Dark)
    ));
    assert_eq!(diagram::config().theme, DiagramTheme::Neutral);

    let rendered = diagram::with_init_directive("pie title Sexo");
    assert!(rendered.contains("\"theme\":\"neutral\""));
    assert!(rendered.contains("\"securityLevel\":\"sandbox\""));
    assert!(rendered.contains("\"fontFamily\":\"Inter\""));
    assert!(rendered.ends_with("}%%\npie title Sexo"));
}
