use bizsuite::app::notify::{report_export, report_import, ConsoleNotifier, Notifier, TracingNotifier};
use bizsuite::config::cli::{Command, ExportFormat};
use bizsuite::core::validators::{accept_all, require_fields};
use bizsuite::domain::model::ExportOutcome;
use bizsuite::utils::error::{BizError, ErrorSeverity};
use bizsuite::utils::validation::{validate_file_extension, Validate};
use bizsuite::utils::{logger, validation};
use bizsuite::{AppConfig, CliConfig, FieldMapping, ImportExportManager, Language, LocalFile};
use bizsuite::{LocalStorage, Translator};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting bizsuite");
    tracing::debug!("CLI config: {:?}", cli);

    let mut config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let translator = match config.translator() {
        Ok(translator) => translator,
        Err(e) => exit_with(e),
    };
    if !translator.initialize().await {
        tracing::warn!("⚠️ Translations unavailable, showing keys and fallbacks");
    }

    // JSON 日誌模式下提示訊息也走 tracing
    let notifier: &dyn Notifier = if cli.json_logs {
        &TracingNotifier
    } else {
        &ConsoleNotifier
    };

    if let Err(e) = run(cli.command, &config, &translator, notifier).await {
        exit_with(e);
    }

    Ok(())
}

fn exit_with(e: BizError) -> ! {
    tracing::error!(
        "❌ bizsuite failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn run(
    command: Command,
    config: &AppConfig,
    translator: &Translator,
    notifier: &dyn Notifier,
) -> bizsuite::Result<()> {
    match command {
        Command::Languages => {
            let current = translator.current_language();
            for language in Language::ALL {
                let info = language.config();
                let marker = if language == current { "*" } else { " " };
                println!(
                    "{} {} {:<8} {} ({})",
                    marker,
                    info.flag,
                    language.code(),
                    info.native_name,
                    info.name
                );
            }
        }
        Command::SetLanguage { code } => {
            if !translator.set_language(&code) {
                return Err(BizError::UnsupportedLanguage { code });
            }
            println!("✅ Language set to {}", translator.current_language());
        }
        Command::Translate { key, fallback } => {
            println!("{}", translator.t(&key, fallback.as_deref()));
        }
        Command::Audit { language } => {
            let languages = match language {
                Some(code) => vec![validation::validate_language_code("--language", &code)?],
                None => Language::ALL
                    .into_iter()
                    .filter(|l| *l != translator.fallback_language())
                    .collect(),
            };
            for language in languages {
                let missing = translator.missing_keys(language);
                println!("🔍 {}: {} missing keys", language, missing.len());
                for key in missing {
                    println!("    {}", key);
                }
            }
        }
        Command::Export {
            input,
            name,
            format,
            headers,
        } => {
            let manager = ImportExportManager::new(LocalStorage::new(&config.export.output_dir));
            let source = manager
                .import_from_json(&LocalFile::new(&input), accept_all())
                .await;
            if source.is_rejected() {
                report_import(&source, translator, notifier);
                std::process::exit(1);
            }

            let outcome = match format {
                ExportFormat::Csv => {
                    let headers = (!headers.is_empty()).then_some(headers.as_slice());
                    manager.export_to_csv(&source.records, &name, headers).await?
                }
                ExportFormat::Json => manager.export_to_json(&source.records, &name).await?,
            };
            report_export(&outcome, translator, notifier);
            if let ExportOutcome::Exported { filename, .. } = outcome {
                println!("📁 Output saved to: {}/{}", config.export.output_dir, filename);
            }
        }
        Command::Import {
            file,
            mapping,
            required,
            show_errors,
        } => {
            let extension = validate_file_extension("--file", &file, &["csv", "json"])?;
            let manager = ImportExportManager::new(LocalStorage::new(&config.export.output_dir));
            let required: Vec<&str> = required.iter().map(String::as_str).collect();
            let source = LocalFile::new(&file);

            let result = if extension == "csv" {
                let mapping = resolve_mapping(config, mapping.as_deref())?;
                manager
                    .import_from_csv(&source, &mapping, require_fields(&required))
                    .await
            } else {
                manager
                    .import_from_json(&source, require_fields(&required))
                    .await
            };

            report_import(&result, translator, notifier);
            if show_errors {
                for error in &result.errors {
                    println!("    {}", error);
                }
            }
        }
    }
    Ok(())
}

fn resolve_mapping(config: &AppConfig, name: Option<&str>) -> bizsuite::Result<FieldMapping> {
    let name = name.ok_or_else(|| BizError::MissingConfigError {
        field: "--mapping".to_string(),
    })?;
    config
        .mapping(name)
        .ok_or_else(|| BizError::InvalidConfigValueError {
            field: "--mapping".to_string(),
            value: name.to_string(),
            reason: format!(
                "Unknown mapping. Built-in mappings: {}",
                FieldMapping::PRESETS.join(", ")
            ),
        })
}
