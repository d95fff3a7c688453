//! Playwright browser automation
//!
//! A spec becomes one node script: one browser context for all of its
//! steps, so cookies and navigation carry over from step to step. The
//! script reports each step as a JSON line on stdout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::spec::TestStep;

/// Playwright browser handle
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
}

#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Playwright(format!("unknown browser: {}", other))),
        }
    }
}

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// One line the script prints per step
#[derive(Debug, Deserialize)]
struct StepEvent {
    step: usize,
    ok: bool,
    #[serde(default)]
    ms: u64,
    #[serde(default)]
    error: Option<String>,
}

/// JavaScript string literal
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;
        std::fs::create_dir_all(&config.screenshot_dir)?;
        Ok(Self { config })
    }

    /// Check if Playwright is installed
    pub fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["--no-install", "playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    fn screenshot_path(&self, name: &str) -> PathBuf {
        self.config.screenshot_dir.join(format!("{}.png", name))
    }

    /// Build the Playwright script for a set of steps
    pub fn build_script(&self, steps: &[TestStep]) -> String {
        let mut script = format!(
            r#"const {{ chromium, firefox, webkit, expect }} = require('@playwright/test');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const baseUrl = {base_url};
  const basePath = new URL(baseUrl).pathname.replace(/\/$/, '');
  let current = 0;
  let started = Date.now();
  const begin = (i) => {{ current = i; started = Date.now(); }};
  const done = () => console.log(JSON.stringify({{ step: current, ok: true, ms: Date.now() - started }}));

  try {{
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            base_url = js_str(&self.config.base_url),
        );

        for (i, step) in steps.iter().enumerate() {
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, step.name()));
            script.push_str(&format!("    begin({});\n", i));
            script.push_str(&self.step_to_js(step));
            script.push_str("\n    done();\n");
        }

        script.push_str(
            r#"
  } catch (error) {
    console.log(JSON.stringify({ step: current, ok: false, ms: Date.now() - started, error: error.message }));
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        script
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, step: &TestStep) -> String {
        match step {
            TestStep::Navigate { url, wait_for_selector } => {
                let wait = wait_for_selector
                    .as_ref()
                    .map(|s| format!("\n    await page.waitForSelector({});", js_str(s)))
                    .unwrap_or_default();
                format!("    await page.goto(baseUrl + {});{}", js_str(url), wait)
            }
            TestStep::Click { selector, timeout_ms } => {
                format!(
                    "    await page.click({}, {{ timeout: {} }});",
                    js_str(selector),
                    timeout_ms.unwrap_or(5000)
                )
            }
            TestStep::ClickText { text, selector } => match selector {
                Some(sel) => format!(
                    "    await page.locator({}).filter({{ hasText: {} }}).first().click();",
                    js_str(sel),
                    js_str(text)
                ),
                None => format!("    await page.getByText({}).first().click();", js_str(text)),
            },
            TestStep::Fill { selector, value } => {
                format!("    await page.fill({}, {});", js_str(selector), js_str(value))
            }
            TestStep::Type { selector, text, delay_ms } => {
                format!(
                    "    await page.locator({}).pressSequentially({}, {{ delay: {} }});",
                    js_str(selector),
                    js_str(text),
                    delay_ms.unwrap_or(50)
                )
            }
            TestStep::Press { selector, key } => match selector {
                Some(sel) => format!("    await page.locator({}).press({});", js_str(sel), js_str(key)),
                None => format!("    await page.keyboard.press({});", js_str(key)),
            },
            TestStep::Wait { selector, timeout_ms, state } => {
                format!(
                    "    await page.waitForSelector({}, {{ state: '{}', timeout: {} }});",
                    js_str(selector),
                    state.as_str(),
                    timeout_ms
                )
            }
            TestStep::Sleep { ms } => format!("    await page.waitForTimeout({});", ms),
            TestStep::Assert { selector, visible, text, text_contains, value, count } => {
                let locator = format!("page.locator({})", js_str(selector));
                let mut assertions = Vec::new();

                match visible {
                    Some(true) => assertions.push(format!("    await expect({}).toBeVisible();", locator)),
                    Some(false) => assertions.push(format!("    await expect({}).toBeHidden();", locator)),
                    None => {}
                }
                if let Some(t) = text {
                    assertions.push(format!("    await expect({}).toHaveText({});", locator, js_str(t)));
                }
                if let Some(tc) = text_contains {
                    assertions.push(format!("    await expect({}).toContainText({});", locator, js_str(tc)));
                }
                if let Some(v) = value {
                    assertions.push(format!("    await expect({}).toHaveValue({});", locator, js_str(v)));
                }
                if let Some(c) = count {
                    assertions.push(format!("    await expect({}).toHaveCount({});", locator, c));
                }

                assertions.join("\n")
            }
            TestStep::AssertPath { path } => {
                format!(
                    r#"    {{
      const expected = basePath + {path};
      await page.waitForURL((u) => u.pathname === expected, {{ timeout: 5000 }}).catch(() => {{
        throw new Error('expected path ' + expected + ', got ' + new URL(page.url()).pathname);
      }});
    }}"#,
                    path = js_str(path)
                )
            }
            TestStep::Screenshot { name, selector, full_page } => {
                let path = self.screenshot_path(name);
                let path = js_str(&path.to_string_lossy());
                match selector {
                    Some(sel) => format!("    await page.locator({}).screenshot({{ path: {} }});", js_str(sel), path),
                    None => format!("    await page.screenshot({{ path: {}, fullPage: {} }});", path, full_page),
                }
            }
            TestStep::Log { message } => format!("    console.error('[TEST] ' + {});", js_str(message)),
        }
    }

    /// Run all steps in one browser session
    pub async fn run_steps(&self, steps: &[TestStep]) -> E2eResult<Vec<StepResult>> {
        for step in steps {
            if let TestStep::Log { message } = step {
                info!("[TEST LOG] {}", message);
            }
        }

        let script = self.build_script(steps);
        let (stdout, stderr, success) = self.run_script(&script).await?;
        let results = self.collect_results(steps, &stdout);

        let failed = results.iter().any(|r| !r.success);
        if !success && !failed {
            return Err(E2eError::Playwright(format!(
                "Script failed:\nstdout: {}\nstderr: {}",
                stdout, stderr
            )));
        }
        Ok(results)
    }

    /// Map the script's step lines back onto the spec's steps
    fn collect_results(&self, steps: &[TestStep], stdout: &str) -> Vec<StepResult> {
        stdout
            .lines()
            .filter_map(|line| serde_json::from_str::<StepEvent>(line).ok())
            .filter_map(|event| {
                let step = steps.get(event.step)?;
                let screenshot_path = match step {
                    TestStep::Screenshot { name, .. } if event.ok => Some(self.screenshot_path(name)),
                    _ => None,
                };
                Some(StepResult {
                    success: event.ok,
                    step_name: step.name(),
                    duration_ms: event.ms,
                    error: event.error,
                    screenshot_path,
                })
            })
            .collect()
    }

    /// Execute a script with node; returns stdout, stderr and exit success
    pub async fn run_script(&self, script: &str) -> E2eResult<(String, String, bool)> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("spec.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path).kill_on_drop(true);
        if let Some(node_path) = &self.config.node_path {
            cmd.env("NODE_PATH", node_path);
        }

        let output = tokio::time::timeout(self.config.script_timeout, cmd.output())
            .await
            .map_err(|_| {
                E2eError::Playwright(format!(
                    "script timed out after {}s",
                    self.config.script_timeout.as_secs()
                ))
            })??;

        Ok((
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.success(),
        ))
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    /// Site root, including any URL prefix
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
    /// `node_modules` holding `@playwright/test`
    pub node_path: Option<PathBuf>,
    pub script_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/my-ai4d-research-bank".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            node_path: std::env::var_os("NODE_PATH").map(PathBuf::from),
            script_timeout: Duration::from_secs(120),
        }
    }
}
