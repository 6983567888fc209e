//! End-to-end demo: save a profile, copy it into the form, submit two
//! reports, and watch them arrive in the live tracker.
//!
//! ```sh
//! cargo run -p bantay-reports --example report_flow
//! ```

use bantay_reports::{
    copy_profile_into_form, save_profile_now, submit_report, ReportForm, ReportTracker,
};
use bantay_test_utils::{sample_profile, MemoryStore, StaticAuth};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bantay_store=debug".into()),
        )
        .init();

    let store = MemoryStore::new();
    let auth = StaticAuth::signed_in("uid-demo", Some("juan@brgy.ph"));

    save_profile_now(&store, &auth, &sample_profile()).await?;

    let mut form = ReportForm {
        report: "Flood warning issued along the creek".to_string(),
        ..ReportForm::default()
    };
    copy_profile_into_form(&store, &auth, &mut form).await?;

    let mut tracker = ReportTracker::open(&store, &auth);
    tracker.next_event().await;

    let first = submit_report(&store, &auth, &form).await?;
    println!("submitted {}", first.report_id);

    form.report = "Water level receding".to_string();
    let second = submit_report(&store, &auth, &form).await?;
    println!("submitted {}", second.report_id);

    tracker.next_event().await;
    tracker.next_event().await;
    for report in tracker.filtered("flood") {
        println!("tracked [{}] {} - {}", report.status, report.report_id, report.report);
    }

    tracker.close();
    Ok(())
}
