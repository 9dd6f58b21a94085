use crate::core::auto_save::AutoSaveEvent;
use crate::core::i18n::Translator;
use crate::domain::model::{ExportOutcome, ImportResult};

/// Presentation-side sink for user-facing notices.
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!("✅ {}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("❌ {}", message);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("✅ {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("❌ {}", message);
    }
}

pub fn report_import(result: &ImportResult, translator: &Translator, notifier: &dyn Notifier) {
    if result.is_rejected() {
        let reason = result.errors.first().cloned().unwrap_or_default();
        notifier.error(&translator.t_fmt(
            "importExport.importRejected",
            Some("Import failed: {reason}"),
            &[("reason", reason)],
        ));
        return;
    }

    notifier.success(&translator.t_fmt(
        "importExport.imported",
        Some("Imported {count} records"),
        &[("count", result.success.to_string())],
    ));

    if result.failed > 0 {
        notifier.error(&translator.t_fmt(
            "importExport.importFailedRecords",
            Some("{count} records failed to import"),
            &[("count", result.failed.to_string())],
        ));
    }
}

pub fn report_export(outcome: &ExportOutcome, translator: &Translator, notifier: &dyn Notifier) {
    match outcome {
        ExportOutcome::Exported { records, .. } => notifier.success(&translator.t_fmt(
            "importExport.exported",
            Some("Exported {count} records"),
            &[("count", records.to_string())],
        )),
        ExportOutcome::NothingToExport => notifier.error(&translator.t(
            "importExport.nothingToExport",
            Some("No data to export"),
        )),
    }
}

pub fn report_auto_save(event: &AutoSaveEvent, translator: &Translator, notifier: &dyn Notifier) {
    match event {
        AutoSaveEvent::Saved => {
            notifier.success(&translator.t("autoSave.autoSaved", Some("Auto-saved")))
        }
        AutoSaveEvent::Failed(_) => {
            notifier.error(&translator.t("autoSave.autoSaveFailed", Some("Auto-save failed")))
        }
    }
}
