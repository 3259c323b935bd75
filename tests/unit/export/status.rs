use super::*;

#[test]
fn status_text_is_stable() {
    assert_eq!(ExportStatus::Started { total: 3 }.to_string(), "0 / 3");
    assert_eq!(
        ExportStatus::Progress {
            completed: 2,
            total: 3
        }
        .to_string(),
        "2 / 3"
    );
    assert_eq!(
        ExportStatus::Finished { exported: 3 }.to_string(),
        "Done: exported 3 images."
    );
    assert_eq!(
        ExportStatus::Cancelled {
            completed: 1,
            total: 3
        }
        .to_string(),
        "Cancelled after 1 / 3"
    );
    assert!(
        ExportStatus::Failed {
            completed: 0,
            total: 2,
            reason: "boom".to_string()
        }
        .to_string()
        .ends_with("boom")
    );
}

#[test]
fn only_end_states_are_terminal() {
    assert!(!ExportStatus::Started { total: 1 }.is_terminal());
    assert!(
        !ExportStatus::Progress {
            completed: 1,
            total: 1
        }
        .is_terminal()
    );
    assert!(ExportStatus::Finished { exported: 1 }.is_terminal());
}

#[test]
fn closures_and_logs_are_sinks() {
    let mut seen = Vec::new();
    {
        let mut sink = |s: &ExportStatus| seen.push(s.to_string());
        sink.publish(&ExportStatus::Started { total: 0 });
    }
    assert_eq!(seen, vec!["0 / 0"]);

    let log = StatusLog::new();
    let mut by_ref = &log;
    by_ref.publish(&ExportStatus::Finished { exported: 0 });
    assert_eq!(log.current_text().as_deref(), Some("Done: exported 0 images."));
}
