// src/main.rs

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::error::Error;

// Response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: String,
    store_revision: u64,
    employee_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushResponse {
    revision: u64,
    employee_count: usize,
}

fn sample_snapshot() -> Value {
    json!({
        "emp-001": {
            "name": "Elif Kaya",
            "monthlySalary": 22000,
            "dailyHours": 8,
            "workRecords": {
                "2024-03": { "1": 8, "4": 9.5, "5": 8, "6": 7.5 }
            },
            "schedules": {
                "2024-03-04": { "startTime": "08:00", "endTime": "17:30" }
            }
        },
        "emp-002": {
            "name": "Mert Demir",
            "monthlySalary": "33000",
            "workRecords": {
                "2024-03": { "1": 10, "4": 10 }
            }
        },
        "emp-003": {
            "name": "Zeynep Arslan",
            "monthlySalary": 18000,
            "workRecords": {}
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url = std::env::var("PAYROLL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let month = "2024-03";
    let date = "2024-03-04";
    let client = Client::new();

    // Test 1: Status
    println!("\n🔍 Testing status endpoint...");
    let status = client
        .get(format!("{}/status", base_url))
        .send()
        .await?
        .json::<StatusResponse>()
        .await?;
    println!("Status response: {:?}", status);

    // Test 2: Push a snapshot
    println!("\n🔍 Pushing sample snapshot...");
    let pushed = client
        .put(format!("{}/api/snapshot", base_url))
        .json(&sample_snapshot())
        .send()
        .await?
        .json::<PushResponse>()
        .await?;
    println!(
        "Snapshot accepted as revision {} with {} employees",
        pushed.revision, pushed.employee_count
    );

    // Test 3: Derived views
    for path in [
        format!("/api/payroll/{}", month),
        format!("/api/schedule/{}", date),
        "/api/dashboard".to_string(),
        "/api/employees".to_string(),
    ] {
        println!("\n🔍 GET {}", path);
        let response = client.get(format!("{}{}", base_url, path)).send().await?;
        println!("Status: {}", response.status());
        let body = response.json::<Value>().await?;
        println!("{}", serde_json::to_string_pretty(&body)?);
    }

    // Test 4: CSV export
    println!("\n🔍 Downloading payroll sheet for {}...", month);
    let response = client
        .get(format!("{}/api/payroll/{}/export", base_url, month))
        .send()
        .await?;
    println!("Export status: {}", response.status());
    println!("{}", response.text().await?);

    // Test 5: Month navigation
    println!("\n🔍 Selecting {} and stepping back one month...", month);
    let selection = client
        .put(format!("{}/api/selection", base_url))
        .json(&json!({ "month": month, "monthOffset": -1, "date": date }))
        .send()
        .await?
        .json::<Value>()
        .await?;
    println!("Selection: {}", selection);
    let response = client.get(format!("{}/api/payroll", base_url)).send().await?;
    println!("Selected payroll status: {}", response.status());
    println!("{}", serde_json::to_string_pretty(&response.json::<Value>().await?)?);

    // Test 6: Rejected input
    println!("\n🔍 Requesting an invalid month...");
    let response = client
        .get(format!("{}/api/payroll/2024-13", base_url))
        .send()
        .await?;
    println!("Invalid month status: {}", response.status());
    println!("Body: {}", response.text().await?);

    let status = client
        .get(format!("{}/status", base_url))
        .send()
        .await?
        .json::<StatusResponse>()
        .await?;
    println!(
        "\nServer is {} at revision {} with {} employees",
        status.status, status.store_revision, status.employee_count
    );

    println!("\n✅ Testing complete!");

    Ok(())
}
