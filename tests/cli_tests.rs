use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn intake_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("intake").unwrap();
    cmd.env("INTAKE_HOME", home.path());
    cmd
}

#[test]
fn no_arguments_prints_usage() {
    let home = TempDir::new().unwrap();
    intake_cmd(&home)
        .assert()
        .success()
        .stderr(contains("Usage: intake"));
}

#[test]
fn forms_lists_the_catalog() {
    let home = TempDir::new().unwrap();
    intake_cmd(&home)
        .args(["--plain", "forms"])
        .assert()
        .success()
        .stdout(contains("cash-buyer-form"))
        .stdout(contains("fast-sell-form"))
        .stdout(contains("/forms/Cash-Buyer"));
}

#[test]
fn version_prints_the_crate_version() {
    let home = TempDir::new().unwrap();
    intake_cmd(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_command_suggests_the_closest_one() {
    let home = TempDir::new().unwrap();
    intake_cmd(&home)
        .args(["--plain", "vlaidate"])
        .assert()
        .failure()
        .stdout(contains("Suggestion: `validate`?"))
        .stderr(contains("unrecognized command `vlaidate`"));
}

#[test]
fn validate_reports_every_broken_rule() {
    let home = TempDir::new().unwrap();
    let lead = home.path().join("lead.json");
    std::fs::write(
        &lead,
        serde_json::json!({
            "FullName": "Dana Builder",
            "CellPhone": "12",
            "Email": "not-an-email"
        })
        .to_string(),
    )
    .unwrap();

    intake_cmd(&home)
        .args(["--plain", "validate"])
        .arg(&lead)
        .assert()
        .failure()
        .stdout(contains("CellPhone: Valid phone number is required."))
        .stdout(contains("Email: Valid email address is required."))
        .stdout(contains("Address: Address is required."))
        .stderr(contains("validation failed"));
}

#[test]
fn validate_accepts_a_complete_draft() {
    let home = TempDir::new().unwrap();
    let lead = home.path().join("lead.json");
    std::fs::write(
        &lead,
        serde_json::json!({
            "FullName": "Dana Builder",
            "CellPhone": "+1 (555) 010-2000",
            "Email": "dana@builder.test",
            "Address": "12 Main St, Springfield",
            "YearsInBusiness": "6",
            "CompletedProjects": "14",
            "CurrentProjects": "2",
            "PropertiesNext6Months": "4",
            "PropertiesPerYear": "8",
            "SourceFinancing": ["Cash on Hand", "Hard Money"],
            "FundingInPlace": "Yes",
            "ProofOfFunds": "Yes",
            "TripleDeals": "Yes",
            "Quickly": "Within a Month",
            "PriceRanges": "150000 - 600000",
            "MinimumProfit": "30000",
            "GoodDealCriteria": "Below market, clean title",
            "PreferredAreas": "Springfield",
            "AvoidedAreas": "Flood zones",
            "MaxPropertyAge": 60,
            "IdealProperty": "3/2 single family",
            "InvestmentStrategy": "Rehab and Resell",
            "PurchaseReadiness": 7
        })
        .to_string(),
    )
    .unwrap();

    intake_cmd(&home)
        .args(["--plain", "validate"])
        .arg(&lead)
        .assert()
        .success()
        .stdout(contains("All checks passed."));
}

#[test]
fn prune_reports_no_removals_for_an_empty_store() {
    let home = TempDir::new().unwrap();
    intake_cmd(&home)
        .args(["--plain", "prune"])
        .assert()
        .success()
        .stdout(contains("Removed 0 stale draft(s)."));
}

#[test]
fn restore_peek_reports_an_empty_stash() {
    let home = TempDir::new().unwrap();
    intake_cmd(&home)
        .args(["--plain", "restore-peek"])
        .assert()
        .success()
        .stdout(contains("No stashed draft for this session."));
}

#[test]
fn fill_rejects_an_unknown_form_id() {
    let home = TempDir::new().unwrap();
    intake_cmd(&home)
        .args(["--plain", "fill", "mystery-form"])
        .assert()
        .failure()
        .stderr(contains("unknown form id `mystery-form`"));
}

#[test]
fn scripted_fill_can_be_dismissed() {
    let home = TempDir::new().unwrap();
    intake_cmd(&home)
        .args(["--plain", "fill"])
        .env("INTAKE_TEST_PROMPTS", "<CANCEL>")
        .assert()
        .success()
        .stdout(contains("Wizard dismissed."));
}

#[test]
fn scripted_fill_walks_the_wizard_to_acceptance() {
    let home = TempDir::new().unwrap();
    let answers = [
        // Contact Information
        "Dana Fulton",
        "<BLANK>",
        "(555) 010-7788",
        "dana@example.com",
        "44 Juniper Lane, Tulsa OK",
        "<BLANK>",
        "Continue",
        // Buying Experience
        "12",
        "30",
        "2",
        "6",
        "10",
        "Continue",
        // Financing
        "Cash on Hand",
        "Yes",
        "No",
        "Yes",
        "Within a Week",
        "Continue",
        // Buy Box (the price range itself runs off the scripted key events)
        "25000",
        "High equity and light rehab",
        "Tulsa metro",
        "Flood zones",
        "<KEEP>",
        "<KEEP>",
        "60",
        "Brick three bed with a yard",
        "Rehab and Resell",
        "<KEEP>",
        "<BLANK>",
        "Submit",
        // Success confirmation after the redirect
        "y",
    ];

    intake_cmd(&home)
        .args(["--plain", "fill"])
        .env("INTAKE_TEST_PROMPTS", answers.join("|"))
        .env("INTAKE_TEST_RANGE_EVENTS", "ENTER")
        .assert()
        .success()
        .stdout(contains("Price range: $0 - $1,000,000"))
        .stdout(contains("Thank you for your submission"))
        .stdout(contains("Form submitted successfully!"));

    // One accepted lead on disk, no draft left behind.
    let leads = std::fs::read_dir(home.path().join("leads")).unwrap().count();
    assert_eq!(leads, 1);
    let drafts = std::fs::read_dir(home.path().join("drafts"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(drafts, 0);
}
