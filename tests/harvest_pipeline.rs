use std::fs;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use predicates::prelude::*;

const LISTING_HTML: &str = r##"<!doctype html>
<html>
  <head><title>LawIndex</title></head>
  <body>
    <div id="mw-content-text">
      <a href="/wiki/חוק_הבדיקה">חוק הבדיקה</a>
      <a href="/wiki/תקנות_הבדיקה">תקנות הבדיקה</a>
      <a href="/wiki/LawIndex?action=edit">עריכה</a>
      <a href="#top">לראש הדף</a>
      <a href="">ריק</a>
      <a href="/wiki/עמוד_ראשי">עמוד ראשי</a>
    </div>
  </body>
</html>
"##;

const LAW_PAGE_HTML: &str = r#"<!doctype html>
<html>
  <head><title>חוק הבדיקה – ויקיטקסט</title></head>
  <body>
    <div id="mw-content-text">
      <h1>חוק הבדיקה</h1>
      <span class="mw-editsection">[עריכה]</span>
      <p>סעיף ראשון.</p>
      <img src="/images/seal.png" alt="seal">
      <div class="law-number"><a href="/wiki/חוק_אחר">חוק אחר</a></div>
      <p class="printonly">להדפסה בלבד</p>
    </div>
  </body>
</html>
"#;

const REGS_PAGE_HTML: &str = r#"<!doctype html>
<html>
  <head><title>תקנות הבדיקה – ויקיטקסט</title></head>
  <body>
    <div id="mw-content-text">
      <h1>תקנות הבדיקה</h1>
      <p>תקנה ראשונה.</p>
    </div>
  </body>
</html>
"#;

const HISTORY_HTML: &str = r#"<!doctype html>
<html>
  <body>
    <ul>
      <li><span class="mw-changeslist-date">16:50, 28 במרץ 2025</span></li>
      <li><span class="mw-changeslist-date">09:12, 1 בינואר 2024</span></li>
    </ul>
  </body>
</html>
"#;

const BAD_HISTORY_HTML: &str = r#"<!doctype html>
<html>
  <body><span class="mw-changeslist-date">עודכן לאחרונה</span></body>
</html>
"#;

fn spawn_wiki_server() -> (String, mpsc::Sender<()>, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let addr = server.server_addr();
    let base_url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let url = request.url().to_string();
            let (raw_path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
            let path = urlencoding::decode(raw_path)
                .map(|p| p.into_owned())
                .unwrap_or_else(|_| raw_path.to_owned());

            let (status, body) = if path == "/w/index.php" && query.contains("action=history") {
                if query.contains("BadIndex") {
                    (200, BAD_HISTORY_HTML)
                } else {
                    (200, HISTORY_HTML)
                }
            } else {
                match path.as_str() {
                    "/wiki/LawIndex" => (200, LISTING_HTML),
                    "/wiki/חוק_הבדיקה" => (200, LAW_PAGE_HTML),
                    "/wiki/תקנות_הבדיקה" => (200, REGS_PAGE_HTML),
                    _ => (404, "not found"),
                }
            };

            let mut response = tiny_http::Response::from_string(body).with_status_code(status);
            if status == 200 {
                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"text/html; charset=utf-8"[..],
                )
                .expect("build header");
                response = response.with_header(header);
            }
            let _ = request.respond(response);
        }
    });

    (base_url, shutdown_tx, handle)
}

#[test]
fn pipeline_harvests_caches_and_gates() -> anyhow::Result<()> {
    let (base_url, shutdown_tx, server_handle) = spawn_wiki_server();
    let temp = tempfile::TempDir::new()?;

    let workspace = temp.path().join("workspace");
    fs::create_dir_all(&workspace)?;
    fs::write(workspace.join("style.css"), "body { direction: rtl; }\n")?;

    let out_dir = workspace.join("rules");
    let marker = workspace.join("last_updated.txt");

    // First harvest: the marker does not exist yet, so the gate proceeds.
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lawsource");
    cmd.current_dir(&workspace)
        .args([
            "harvest",
            "--base-url",
            &base_url,
            "--title",
            "LawIndex",
            "--out",
            out_dir.to_str().unwrap(),
            "--marker",
            marker.to_str().unwrap(),
            "--delay-ms",
            "0",
            "--pandoc",
            "definitely-not-a-real-converter",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Processed 2 entries: 2 saved (0 converted), 0 unchanged, 0 failed.",
        ));

    assert_eq!(fs::read_to_string(&marker)?, "28/03/2025");

    let law_path = out_dir.join("חוק_הבדיקה.htm");
    let law_html = fs::read_to_string(&law_path)?;
    assert!(law_html.contains(r#"<html lang="he" dir="rtl">"#));
    assert!(law_html.contains("סעיף ראשון."));
    assert!(!law_html.contains("<img"), "images must be stripped");
    assert!(!law_html.contains("להדפסה בלבד"), "printonly must be stripped");
    assert!(!law_html.contains("mw-editsection"));
    // Without --demote-law-refs the cross-reference link survives intact.
    assert!(law_html.contains("law-number"));
    assert!(law_html.contains("<a "));
    assert!(!law_html.contains("ref-label"));

    let regs_path = out_dir.join("תקנות_הבדיקה.htm");
    assert!(regs_path.exists(), "expected second law page artifact");

    assert!(
        out_dir.join("style.css").exists(),
        "expected stylesheet to be copied next to the artifacts"
    );
    assert!(
        !out_dir.join("חוק_הבדיקה.docx").exists(),
        "conversion was expected to be skipped (missing converter)"
    );

    let report = fs::read_to_string(out_dir.join("links.jsonl"))?;
    let records: Vec<serde_json::Value> = report
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("parse link record json"))
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["key"], "חוק_הבדיקה");
    assert_eq!(records[1]["key"], "תקנות_הבדיקה");

    // Second harvest: the marker matches the remote revision, so nothing runs.
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lawsource");
    cmd.current_dir(&workspace)
        .args([
            "harvest",
            "--base-url",
            &base_url,
            "--title",
            "LawIndex",
            "--out",
            out_dir.to_str().unwrap(),
            "--marker",
            marker.to_str().unwrap(),
            "--delay-ms",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Remote revision unchanged; nothing to do.",
        ));

    // Forced harvest: the gate is bypassed; unchanged content is not rewritten.
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lawsource");
    cmd.current_dir(&workspace)
        .args([
            "harvest",
            "--force",
            "--base-url",
            &base_url,
            "--title",
            "LawIndex",
            "--out",
            out_dir.to_str().unwrap(),
            "--marker",
            marker.to_str().unwrap(),
            "--delay-ms",
            "0",
            "--pandoc",
            "definitely-not-a-real-converter",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Processed 2 entries: 0 saved (0 converted), 2 unchanged, 0 failed.",
        ));

    // The links command reports without writing any artifact.
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lawsource");
    cmd.current_dir(&workspace)
        .args(["links", "--base-url", &base_url, "--title", "LawIndex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 law rule links"));

    // Import trusts the table and demotes cross-reference links by default.
    let table = workspace.join("rules.tsv");
    fs::write(&table, "my_law\tחוק הבדיקה\n")?;
    let import_dir = workspace.join("imported");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lawsource");
    cmd.current_dir(&workspace)
        .args([
            "import",
            "--base-url",
            &base_url,
            "--list",
            table.to_str().unwrap(),
            "--out",
            import_dir.to_str().unwrap(),
            "--delay-ms",
            "0",
            "--pandoc",
            "definitely-not-a-real-converter",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Processed 1 entries: 1 saved (0 converted), 0 unchanged, 0 failed.",
        ));

    let imported = fs::read_to_string(import_dir.join("my_law.htm"))?;
    assert!(imported.contains(r#"class="ref-label""#));
    assert!(imported.contains("data-href="));
    assert!(imported.contains("חוק אחר"));

    // check: the marker matches the remote revision.
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lawsource");
    cmd.current_dir(&workspace)
        .args([
            "check",
            "--base-url",
            &base_url,
            "--title",
            "LawIndex",
            "--marker",
            marker.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date."));

    // check with a fresh marker reports an update and records the revision.
    let fresh_marker = workspace.join("fresh_marker.txt");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lawsource");
    cmd.current_dir(&workspace)
        .args([
            "check",
            "--base-url",
            &base_url,
            "--title",
            "LawIndex",
            "--marker",
            fresh_marker.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available."));
    assert_eq!(fs::read_to_string(&fresh_marker)?, "28/03/2025");

    // An unparseable history date fails open without touching the marker.
    let bad_marker = workspace.join("bad_marker.txt");
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lawsource");
    cmd.current_dir(&workspace)
        .args([
            "check",
            "--base-url",
            &base_url,
            "--title",
            "BadIndex",
            "--marker",
            bad_marker.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Update available."));
    assert!(
        !bad_marker.exists(),
        "gate must not record a revision it could not parse"
    );

    let _ = shutdown_tx.send(());
    let _ = server_handle.join();

    Ok(())
}
