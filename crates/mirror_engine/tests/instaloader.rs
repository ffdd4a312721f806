#![cfg(unix)]

mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use common::init_logging;
use mirror_engine::{
    post_url, HarvestError, HarvestSettings, Harvester, InstaloaderHarvester, LatestItem,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Records the full argument list, then leaves `$dir` set to the value
/// following `--dirname-pattern`.
const PARSE_ARGS: &str = r#"all="$*"
dir=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--dirname-pattern" ]; then dir="$2"; shift; fi
  shift
done
"#;

/// Settings running `sh <script>` in place of the real tool.
fn script_settings(temp: &TempDir, body: &str) -> HarvestSettings {
    let script = temp.path().join("fake-instaloader.sh");
    fs::write(&script, format!("{PARSE_ARGS}{body}\n")).unwrap();
    HarvestSettings {
        command: "sh".to_string(),
        command_args: vec![script.to_string_lossy().into_owned()],
        probe_timeout: Duration::from_secs(10),
        download_timeout: Duration::from_secs(10),
        ..HarvestSettings::new(temp.path().join("downloads"))
    }
}

fn harvester_with_script(temp: &TempDir, body: &str) -> InstaloaderHarvester {
    InstaloaderHarvester::new(script_settings(temp, body))
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn read_args(dir: &Path) -> String {
    fs::read_to_string(dir.join("args.txt")).unwrap()
}

#[tokio::test]
async fn latest_item_comes_from_probe_metadata() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let harvester = harvester_with_script(
        &temp,
        r#"printf '%s' "$all" > "$dir/args.txt"
printf '{"node": {"shortcode": "NEW1"}}' > "$dir/2024-02-01_UTC.json""#,
    );

    let item = harvester.latest_item("alice").await;
    assert_eq!(
        item,
        Some(LatestItem {
            id: "NEW1".to_string(),
            source_url: post_url("NEW1"),
        })
    );

    let args = read_args(&harvester.probe_dir("alice"));
    assert!(args.contains("--no-pictures"), "{args}");
    assert!(args.contains("--count=1"), "{args}");
    assert!(args.ends_with(" alice"), "{args}");
}

#[tokio::test]
async fn stale_probe_metadata_is_cleared_before_probing() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let harvester = harvester_with_script(&temp, ":");
    let probe_dir = harvester.probe_dir("alice");
    fs::create_dir_all(&probe_dir).unwrap();
    fs::write(probe_dir.join("stale.json"), r#"{"shortcode": "OLD"}"#).unwrap();

    assert_eq!(harvester.latest_item("alice").await, None);
    assert!(!probe_dir.join("stale.json").exists());
}

#[tokio::test]
async fn failed_probe_yields_no_item() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let harvester = harvester_with_script(
        &temp,
        r#"printf '{"shortcode": "X"}' > "$dir/a.json"
echo "login required" >&2
exit 1"#,
    );

    assert_eq!(harvester.latest_item("private_account").await, None);
}

#[tokio::test]
async fn probe_that_hangs_is_cut_off_at_the_timeout() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut settings = script_settings(&temp, "exec sleep 5");
    settings.probe_timeout = Duration::from_millis(200);
    let harvester = InstaloaderHarvester::new(settings);

    let started = Instant::now();
    assert_eq!(harvester.latest_item("alice").await, None);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn download_returns_images_from_the_item_dir() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let harvester = harvester_with_script(
        &temp,
        r#"printf '%s' "$all" > "$dir/args.txt"
printf x > "$dir/2024-02-01_UTC_C9_2.jpg"
printf x > "$dir/2024-02-01_UTC_C9_1.jpg"
printf x > "$dir/2024-02-01_UTC_C9.mp4""#,
    );
    let item = LatestItem::from_shortcode("C9");

    let images = harvester.download("alice", &item).await.unwrap();

    let item_dir = harvester.item_dir("alice", "C9");
    assert!(images.iter().all(|path| path.parent() == Some(item_dir.as_path())));
    assert_eq!(
        file_names(&images),
        vec!["2024-02-01_UTC_C9_1.jpg", "2024-02-01_UTC_C9_2.jpg"]
    );
    let args = read_args(&item_dir);
    assert!(args.contains("--no-metadata-json"), "{args}");
    assert!(args.ends_with(&item.source_url), "{args}");
}

#[tokio::test]
async fn failed_download_is_an_error_with_output() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let harvester = harvester_with_script(&temp, "echo 'rate limited' >&2\nexit 3");

    let err = harvester
        .download("alice", &LatestItem::from_shortcode("C9"))
        .await
        .unwrap_err();
    match err {
        HarvestError::Failed { output, .. } => assert!(output.contains("rate limited"), "{output}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn download_that_hangs_times_out() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let mut settings = script_settings(&temp, "exec sleep 5");
    settings.download_timeout = Duration::from_millis(200);
    let harvester = InstaloaderHarvester::new(settings);

    let err = harvester
        .download("alice", &LatestItem::from_shortcode("C9"))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::Timeout { .. }), "{err:?}");
}

#[tokio::test]
async fn missing_command_is_no_item_on_probe_and_an_error_on_download() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let harvester = InstaloaderHarvester::new(HarvestSettings {
        command: temp
            .path()
            .join("no-such-instaloader")
            .to_string_lossy()
            .into_owned(),
        ..HarvestSettings::new(temp.path().join("downloads"))
    });

    assert_eq!(harvester.latest_item("alice").await, None);
    let err = harvester
        .download("alice", &LatestItem::from_shortcode("C9"))
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::Spawn { .. }), "{err:?}");
}
