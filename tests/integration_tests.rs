use glasscut::domain::model::PlanReport;
use glasscut::{CliConfig, CuttingPipeline, LocalStorage, PlanEngine};
use httpmock::prelude::*;
use tempfile::TempDir;

fn config_for(endpoint: String, output_path: String) -> CliConfig {
    CliConfig {
        api_endpoint: endpoint,
        input_csv: None,
        output_path,
        compress: false,
        no_rotation: false,
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_end_to_end_plan_from_http_report() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let mock_data = serde_json::json!([
        {"ITEM": "CC06T", "Esp": 6, "Largo": 800, "Ancho": 1200, "Pzs.": 2},
        {"ITEM": "CC06T", "Esp": 6, "Largo": 500, "Ancho": 500, "Pzs.": 3},
        {"ITEM": "CC10T", "Esp": 10, "Largo": 1167, "Ancho": 2180, "Pzs.": 4}
    ]);

    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/produccion");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(mock_data);
    });

    let config = config_for(server.url("/produccion"), output_path.clone());
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = CuttingPipeline::new(storage, config);
    let engine = PlanEngine::new_with_monitoring(pipeline, false);

    let result = engine.run().await;
    assert!(result.is_ok());
    api_mock.assert();

    let output_file_path = result.unwrap();
    assert!(output_file_path.contains("cut_plan.json"));

    // Report exists and has both glass codes
    let report_path = std::path::Path::new(&output_path).join("cut_plan.json");
    let report_content = std::fs::read_to_string(&report_path).unwrap();
    let report: PlanReport = serde_json::from_str(&report_content).unwrap();

    assert_eq!(report.glass.len(), 2);
    let cl6 = report.glass.get("CL6").unwrap();
    assert_eq!(cl6.summary.total_pieces, 5);
    assert!(cl6.summary.overall_efficiency > 0.0);
    assert!(cl6.summary.overall_efficiency <= 100.0);

    let cl10 = report.glass.get("CL10").unwrap();
    assert_eq!(cl10.summary.total_pieces, 4);
    for sheet in &cl10.sheets {
        assert_eq!(sheet.dimensions.thickness, 10);
        assert_eq!(sheet.pieces.is_empty(), false);
    }

    // Cut lists per code
    assert!(std::path::Path::new(&output_path)
        .join("cut_list_CL6.csv")
        .exists());
    assert!(std::path::Path::new(&output_path)
        .join("cut_list_CL10.csv")
        .exists());

    let cut_list = std::fs::read_to_string(
        std::path::Path::new(&output_path).join("cut_list_CL6.csv"),
    )
    .unwrap();
    assert!(cut_list.contains("code,thickness_mm,width_mm,height_mm,quantity"));
    assert!(cut_list.contains("CL6,6,800,1200,2"));
}

#[tokio::test]
async fn test_end_to_end_zip_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let mock_data = serde_json::json!([
        {"ITEM": "CC06T", "Esp": 6, "Largo": 800, "Ancho": 1200, "Pzs.": 1}
    ]);

    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/produccion");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(mock_data);
    });

    let mut config = config_for(server.url("/produccion"), output_path.clone());
    config.compress = true;

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = CuttingPipeline::new(storage, config);
    let engine = PlanEngine::new(pipeline);

    let result = engine.run().await.unwrap();
    api_mock.assert();
    assert!(result.contains("cut_plan.zip"));

    let zip_path = std::path::Path::new(&output_path).join("cut_plan.zip");
    let zip_data = std::fs::read(&zip_path).unwrap();
    let cursor = std::io::Cursor::new(zip_data);
    let mut archive = zip::ZipArchive::new(cursor).unwrap();

    let mut file_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    file_names.sort();
    assert_eq!(file_names, vec!["cut_list_CL6.csv", "cut_plan.json"]);

    let mut report_file = archive.by_name("cut_plan.json").unwrap();
    let mut content = String::new();
    std::io::Read::read_to_string(&mut report_file, &mut content).unwrap();
    let report: PlanReport = serde_json::from_str(&content).unwrap();
    assert!(report.glass.contains_key("CL6"));
}

#[tokio::test]
async fn test_end_to_end_report_failure_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/down");
        then.status(500);
    });

    let config = config_for(server.url("/down"), output_path.clone());
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = CuttingPipeline::new(storage, config);
    let engine = PlanEngine::new(pipeline);

    let result = engine.run().await;
    assert!(result.is_err());
    api_mock.assert();

    // Nothing should have been written
    assert!(!std::path::Path::new(&output_path)
        .join("cut_plan.json")
        .exists());
}

#[tokio::test]
async fn test_end_to_end_from_csv_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let csv_path = temp_dir.path().join("cutting_list.csv");
    std::fs::write(
        &csv_path,
        "ITEM,Esp,Largo,Ancho,Pzs.\nCC06T,6,800,1200,2\nCC06T,6,500,500,3\n",
    )
    .unwrap();

    let mut config = config_for("http://unused.example".to_string(), output_path.clone());
    config.input_csv = Some(csv_path.to_str().unwrap().to_string());

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = CuttingPipeline::new(storage, config);
    let engine = PlanEngine::new(pipeline);

    let result = engine.run().await.unwrap();
    assert!(result.contains("cut_plan.json"));

    let report_content = std::fs::read_to_string(
        std::path::Path::new(&output_path).join("cut_plan.json"),
    )
    .unwrap();
    let report: PlanReport = serde_json::from_str(&report_content).unwrap();
    assert_eq!(report.glass.get("CL6").unwrap().summary.total_pieces, 5);
}

#[tokio::test]
async fn test_unknown_glass_code_fails_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let mock_data = serde_json::json!([
        {"ITEM": "TRIPLEX99", "Esp": 99, "Largo": 500, "Ancho": 500, "Pzs.": 1}
    ]);

    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/produccion");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(mock_data);
    });

    let config = config_for(server.url("/produccion"), output_path.clone());
    let storage = LocalStorage::new(output_path);
    let pipeline = CuttingPipeline::new(storage, config);
    let engine = PlanEngine::new(pipeline);

    let err = engine.run().await.unwrap_err();
    api_mock.assert();
    assert!(matches!(err, glasscut::CutError::UnknownGlassCode { .. }));
}
