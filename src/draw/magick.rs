use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::RenderConfig;
use crate::error::{ChartError, ChartResult};

use super::{
    DrawingProvider, Fill, PathCommand, Stroke, TextPosition, TextSettings, Transform,
    warn_unsupported,
};

const BACKEND: &str = "magick";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Builds an ImageMagick `convert` argument list and runs it at build time.
/// Text blocks become sized `label:` images composited with `-gravity` and
/// `-geometry`, which is the coordinate model [`super::Gravity`] describes.
#[derive(Debug, Clone)]
pub struct MagickProvider {
    binary: String,
    width: f32,
    height: f32,
    background: String,
    font_family: String,
    args: Vec<String>,
    border: Option<(u32, String)>,
    timeout: Option<Duration>,
}

impl MagickProvider {
    pub fn new(width: f32, height: f32, config: &RenderConfig) -> Self {
        Self {
            binary: config.magick_binary.clone(),
            width,
            height,
            background: config.background.clone(),
            font_family: config.font_family.clone(),
            args: Vec::new(),
            border: None,
            timeout: None,
        }
    }

    /// Kill the tool if it has not finished after `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Full argument list for the tool, excluding the binary itself.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "-size".to_string(),
            format!("{}x{}", px(self.width), px(self.height)),
            format!("canvas:{}", self.background),
        ];
        args.extend(self.args.iter().cloned());
        if let Some((thickness, color)) = &self.border {
            // Shave first so the border lands inside the canvas.
            args.extend([
                "-shave".to_string(),
                format!("{thickness}x{thickness}"),
                "-bordercolor".to_string(),
                color.clone(),
                "-border".to_string(),
                format!("{thickness}x{thickness}"),
            ]);
        }
        args.push("png:-".to_string());
        args
    }

    fn push<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(items.into_iter().map(Into::into));
    }
}

impl DrawingProvider for MagickProvider {
    fn set_border(&mut self, thickness: f32, color: &str) -> &mut Self {
        let thickness = px(thickness).max(0) as u32;
        self.border = (thickness > 0).then(|| (thickness, color.to_string()));
        self
    }

    fn draw_path(&mut self, path: &[PathCommand], stroke: &Stroke) -> &mut Self {
        let d = path
            .iter()
            .map(|command| match command {
                PathCommand::MoveTo(x, y) => format!("M {x},{y}"),
                PathCommand::LineTo(x, y) => format!("L {x},{y}"),
            })
            .collect::<Vec<_>>()
            .join(" ");
        if d.is_empty() {
            return self;
        }
        let draw = format!("{}path '{d}'", dash_prefix(stroke));
        self.push(["-fill", "none", "-stroke", stroke.color(), "-draw", draw.as_str()]);
        self
    }

    fn draw_rectangle(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: &Stroke,
        fill: &Fill,
    ) -> &mut Self {
        let draw = format!("{}rectangle {x1},{y1} {x2},{y2}", dash_prefix(stroke));
        self.push([
            "-fill",
            fill.as_paint(),
            "-stroke",
            stroke.color(),
            "-draw",
            draw.as_str(),
        ]);
        self
    }

    fn draw_text(
        &mut self,
        position: &TextPosition,
        text: &str,
        settings: &TextSettings,
        transform: Option<&Transform>,
    ) -> &mut Self {
        let border = settings.border().map(|(t, color)| (px(t).max(0), color));
        let inset = border.map(|(t, _)| t).unwrap_or(0);
        // The label is sized so that label plus border is exactly width x height.
        let label_w = (px(position.width) - 2 * inset).max(1);
        let label_h = (px(position.height) - 2 * inset).max(1);

        let mut block: Vec<String> = vec![
            "(".to_string(),
            "-background".to_string(),
            settings.background.clone().unwrap_or_else(|| "none".to_string()),
            "-fill".to_string(),
            settings.text_color().to_string(),
            "-font".to_string(),
            primary_family(&self.font_family),
            "-size".to_string(),
            format!("{label_w}x{label_h}"),
            "-stroke".to_string(),
            "none".to_string(),
            "-gravity".to_string(),
            settings.text_gravity().magick_name().to_string(),
            format!("label:{}", escape_label(text)),
        ];
        // -border grows the label already in the list.
        if let Some((thickness, color)) = border {
            // Under the default Over compose a transparent label is filled
            // with the border color; Copy keeps its interior clear.
            let clear = settings.background.is_none();
            if clear {
                block.extend(["-compose".to_string(), "Copy".to_string()]);
            }
            block.extend([
                "-bordercolor".to_string(),
                color.to_string(),
                "-border".to_string(),
                format!("{thickness}x{thickness}"),
            ]);
            if clear {
                block.extend(["-compose".to_string(), "Over".to_string()]);
            }
        }
        match transform {
            Some(Transform::Matrix([a, b, c, d, e, f])) => {
                block.extend([
                    "-affine".to_string(),
                    format!("{a},{b},{c},{d},{e},{f}"),
                    "-transform".to_string(),
                ]);
            }
            Some(Transform::Rotate { degrees, .. }) => {
                block.extend(["-rotate".to_string(), format!("{degrees}")]);
            }
            Some(other) => warn_unsupported(BACKEND, other),
            None => {}
        }
        block.push(")".to_string());

        let gravity = position.gravity();
        block.extend([
            "-gravity".to_string(),
            gravity.magick_name().to_string(),
            "-geometry".to_string(),
            format!("{:+}{:+}", px(position.x), px(position.y)),
            "-composite".to_string(),
        ]);
        self.args.extend(block);
        self
    }

    fn build(self) -> ChartResult<Vec<u8>> {
        let args = self.arguments();
        run_tool(&self.binary, &args, self.timeout)
    }
}

/// Child process that is always killed and reaped, even on early return.
struct ReapOnDrop {
    child: Option<Child>,
}

impl ReapOnDrop {
    fn wait(&mut self, timeout: Option<Duration>) -> ChartResult<ExitStatus> {
        let Some(child) = self.child.as_mut() else {
            return Err(ChartError::backend(BACKEND, "process already reaped"));
        };
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    self.child = None;
                    return Ok(status);
                }
                Ok(None) => {
                    if let Some(limit) = timeout
                        && start.elapsed() >= limit
                    {
                        return Err(ChartError::backend(
                            BACKEND,
                            format!("timed out after {}ms", limit.as_millis()),
                        ));
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(ChartError::backend(BACKEND, format!("failed to wait: {e}")));
                }
            }
        }
    }
}

impl Drop for ReapOnDrop {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

/// Runs `binary args...` and returns its stdout. Fails on spawn errors,
/// non-zero exit, timeout or empty output.
pub fn run_tool(binary: &str, args: &[String], timeout: Option<Duration>) -> ChartResult<Vec<u8>> {
    tracing::debug!(binary, args = ?args, "running image tool");
    let child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ChartError::backend(BACKEND, format!("failed to start {binary}: {e}")))?;
    let mut guard = ReapOnDrop { child: Some(child) };
    let started = Instant::now();

    let (stdout, stderr) = match guard.child.as_mut() {
        Some(child) => (child.stdout.take(), child.stderr.take()),
        None => (None, None),
    };
    let stdout = stdout.ok_or_else(|| ChartError::backend(BACKEND, "failed to capture stdout"))?;
    let stderr = stderr.ok_or_else(|| ChartError::backend(BACKEND, "failed to capture stderr"))?;
    // Drain both pipes concurrently so a full pipe cannot stall the tool.
    let stdout_task = drain(stdout);
    let stderr_task = drain(stderr);

    let status = guard.wait(timeout);
    // On timeout the guard kills the child, which closes the pipes.
    drop(guard);
    let output = stdout_task.join().unwrap_or_default();
    let errors = stderr_task.join().unwrap_or_default();
    let status = status?;

    let stderr_text = String::from_utf8_lossy(&errors);
    if !status.success() {
        return Err(ChartError::backend(
            BACKEND,
            format!("{binary} exited with {status}: {}", stderr_text.trim()),
        ));
    }
    if output.is_empty() {
        return Err(ChartError::backend(
            BACKEND,
            format!("{binary} produced no output: {}", stderr_text.trim()),
        ));
    }
    tracing::info!(
        binary,
        bytes = output.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "image tool finished"
    );
    Ok(output)
}

fn px(value: f32) -> i64 {
    value.round() as i64
}

fn dash_prefix(stroke: &Stroke) -> String {
    match stroke.dashes() {
        Some(pattern) => {
            let values: Vec<String> = pattern.iter().map(|v| format!("{v}")).collect();
            format!("stroke-dasharray {} ", values.join(" "))
        }
        None => String::new(),
    }
}

fn primary_family(font_family: &str) -> String {
    font_family
        .split(',')
        .next()
        .map(|name| name.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "DejaVu-Sans".to_string())
}

/// `label:` reads a file for a leading `@` and expands `%` escapes.
fn escape_label(text: &str) -> String {
    let escaped = text.replace('%', "%%");
    match escaped.strip_prefix('@') {
        Some(rest) => format!("\\@{rest}"),
        None => escaped,
    }
}
