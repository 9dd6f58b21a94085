use bizsuite::core::validators::{accept_all, require_fields};
use bizsuite::domain::model::ExportOutcome;
use bizsuite::{FieldMapping, ImportExportManager, LocalFile, LocalStorage, Record};
use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

fn manager(output: &TempDir) -> ImportExportManager<LocalStorage> {
    ImportExportManager::new(LocalStorage::new(output.path().to_string_lossy().to_string()))
        .with_date_provider(|| NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
}

fn record(value: serde_json::Value) -> Record {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_contact_csv_import_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("contacts.csv");
    std::fs::write(
        &csv_path,
        "Name,Email,Phone,Company\r\n\
         Aziz,aziz@example.uz,+998901234567,\"Olmazor, LLC\"\r\n\
         \r\n\
         Dilnoza,dilnoza@example.uz,,Tashkent Trade\r\n",
    )
    .unwrap();

    let manager = manager(&temp_dir);
    let result = manager
        .import_from_csv(
            &LocalFile::new(&csv_path),
            &FieldMapping::contact(),
            accept_all(),
        )
        .await;

    assert_eq!(result.success, 2);
    assert_eq!(result.failed, 0);
    assert!(result.errors.is_empty());
    assert_eq!(
        result.records[0].get("company_name"),
        Some(&json!("Olmazor, LLC"))
    );
    assert_eq!(result.records[1].get("phone"), Some(&json!("")));
}

#[tokio::test]
async fn test_failing_third_data_row_reports_row_four() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("tx.csv");
    std::fs::write(
        &csv_path,
        "Date,Amount,Description\n\
         2024-01-01,100,Rent\n\
         2024-01-02,250,Supplies\n\
         2024-01-03,,Refund\n",
    )
    .unwrap();

    let manager = manager(&temp_dir);
    let result = manager
        .import_from_csv(
            &LocalFile::new(&csv_path),
            &FieldMapping::transaction(),
            require_fields(&["amount"]),
        )
        .await;

    assert_eq!(result.success, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Row 4:"));
}

#[tokio::test]
async fn test_missing_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let manager = manager(&temp_dir);

    let result = manager
        .import_from_json(&LocalFile::new(temp_dir.path().join("absent.json")), accept_all())
        .await;

    assert!(result.is_rejected());
    assert_eq!(result.errors, vec!["Failed to read file"]);
}

#[tokio::test]
async fn test_export_writes_dated_files() {
    let temp_dir = TempDir::new().unwrap();
    let manager = manager(&temp_dir);
    let records = vec![
        record(json!({"id": 1, "name": "Shirt", "price": 45000})),
        record(json!({"id": 2, "name": "Cap, blue", "price": null})),
    ];

    let outcome = manager
        .export_to_csv(&records, "products", None)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ExportOutcome::Exported {
            filename: "products_2024-03-15.csv".to_string(),
            records: 2
        }
    );

    let written = std::fs::read_to_string(temp_dir.path().join("products_2024-03-15.csv")).unwrap();
    assert_eq!(written, "id,name,price\n1,Shirt,45000\n2,\"Cap, blue\",");

    let empty = manager.export_to_json(&[], "products").await.unwrap();
    assert_eq!(empty, ExportOutcome::NothingToExport);
    assert!(!temp_dir.path().join("products_2024-03-15.json").exists());
}

#[tokio::test]
async fn test_json_export_then_import() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let manager = manager(&temp_dir);
    let records = vec![
        record(json!({"invoice_number": "INV-001", "total": 1200.5, "paid": true})),
        record(json!({"invoice_number": "INV-002", "total": 80, "paid": false})),
    ];

    let outcome = manager.export_to_json(&records, "invoices").await?;
    let filename = match &outcome {
        ExportOutcome::Exported { filename, .. } => filename.clone(),
        other => anyhow::bail!("expected an export, got {:?}", other),
    };

    let result = manager
        .import_from_json(
            &LocalFile::new(temp_dir.path().join(&filename)),
            require_fields(&["invoice_number"]),
        )
        .await;

    assert_eq!(result.success, 2);
    assert_eq!(result.failed, 0);
    assert_eq!(result.records, records);
    Ok(())
}

#[tokio::test]
async fn test_csv_export_then_import_keeps_text() {
    let temp_dir = TempDir::new().unwrap();
    let manager = manager(&temp_dir);
    let records = vec![record(json!({
        "name": "Bekzod",
        "email": "bekzod@example.uz",
        "company_name": "Say \"Hi\", Inc."
    }))];
    let headers = vec![
        "name".to_string(),
        "email".to_string(),
        "company_name".to_string(),
    ];

    manager
        .export_to_csv(&records, "contacts", Some(headers.as_slice()))
        .await
        .unwrap();

    let mapping = FieldMapping::new()
        .with("name", "name")
        .with("email", "email")
        .with("company_name", "company_name");
    let result = manager
        .import_from_csv(
            &LocalFile::new(temp_dir.path().join("contacts_2024-03-15.csv")),
            &mapping,
            accept_all(),
        )
        .await;

    assert_eq!(result.success, 1);
    assert_eq!(result.records[0], records[0]);
}
