use pakt_util::errors::PaktError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = PaktError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_config_error_display() {
    let err = PaktError::Config {
        message: "import 'std' refers to nonexistent target 'core'".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Configuration error: import 'std' refers to nonexistent target 'core'"
    );
}

#[test]
fn test_graph_error_display() {
    let err = PaktError::Graph {
        message: "unknown target".to_string(),
    };
    assert_eq!(err.to_string(), "Graph error: unknown target");
}

#[test]
fn test_parse_error_display() {
    let err = PaktError::Parse {
        message: "bad version".to_string(),
    };
    assert_eq!(err.to_string(), "Parse error: bad version");
}

#[test]
fn test_resolution_error_display() {
    let err = PaktError::Resolution {
        message: "missing collection foo@bar".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Dependency resolution failed: missing collection foo@bar"
    );
}

#[test]
fn test_network_error_display() {
    let err = PaktError::Network {
        message: "timeout".to_string(),
    };
    assert_eq!(err.to_string(), "Network error: timeout");
}

#[test]
fn test_download_error_display() {
    let err = PaktError::Download {
        message: "not all requested packages could be downloaded".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Download failed: not all requested packages could be downloaded"
    );
}

#[test]
fn test_generic_error_display() {
    let err = PaktError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_error_converts_into_report() {
    let err = PaktError::Graph {
        message: "cycle".to_string(),
    };
    let report: miette::Report = err.into();
    assert!(report.downcast_ref::<PaktError>().is_some());
}
