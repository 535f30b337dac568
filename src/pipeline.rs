//! End-to-end label pipeline
//!
//! Template → drawing + settings → engine print file → engraver.

use std::time::Duration;

use lamicoid_communication::{JobDriver, NetworkDispatcher, PrintEngine, ProgressSnapshot};
use lamicoid_core::{DeviceModel, Error, Result, SerializeError};
use lamicoid_designer::job_settings::EngraveProcess;
use lamicoid_designer::{
    Canvas, DrawingOptions, ElementKind, FontMetricsProvider, JobSettings, LamicoidTemplate,
    Rect, SvgRenderer, TextElement, TextStyle, VariableTextElement, VariableValues,
    VectorProcess,
};
use lamicoid_settings::Config;

/// One row of a stacked label.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelRow {
    /// Fixed text
    Text(String),
    /// A variable filled in per label
    Variable { name: String, default: String },
}

/// Builds a template whose rows share the content height equally, top to
/// bottom. Row rectangles are relative to the content origin.
pub fn stacked_label(
    name: &str,
    canvas: Canvas,
    rows: &[LabelRow],
    style: &TextStyle,
) -> LamicoidTemplate {
    let mut template = LamicoidTemplate::new(name, canvas);
    if rows.is_empty() {
        return template;
    }

    let content = canvas.content_rect();
    let row_height = content.height / rows.len() as f64;
    for (i, row) in rows.iter().enumerate() {
        let kind = match row {
            LabelRow::Text(text) => {
                ElementKind::Text(TextElement::new(text.clone()).with_style(style.clone()))
            }
            LabelRow::Variable { name, default } => ElementKind::VariableText(
                VariableTextElement::new(name.clone())
                    .with_default(default.clone())
                    .with_style(style.clone()),
            ),
        };
        let requested = Rect::new(0.0, i as f64 * row_height, content.width, row_height);
        template.add_element(kind, requested);
    }
    template
}

/// A canvas with the configured defaults.
pub fn default_canvas(config: &Config) -> Canvas {
    let c = &config.canvas;
    Canvas::new(
        c.width_mm,
        c.height_mm,
        c.corner_radius_mm,
        c.margin_mm,
        c.grid_spacing_mm,
    )
}

/// The settings document for a label job, from the configured presets.
pub fn job_settings(config: &Config, job_name: &str) -> JobSettings {
    let engrave = config.engrave.enabled.then(|| EngraveProcess {
        speed: config.engrave.speed,
        power: config.engrave.power,
        resolution: config.engrave.resolution,
        cycles: config.engrave.cycles,
        ..EngraveProcess::default()
    });
    let cut = VectorProcess {
        speed: config.cut.speed,
        power: config.cut.power,
        frequency: config.cut.frequency,
        cycles: config.cut.cycles,
        ..VectorProcess::default()
    };
    JobSettings::for_lamicoid(job_name, &config.laser.firmware_version, engrave, cut)
}

/// Drives a label from its template to the engraver.
pub struct Pipeline<'a> {
    config: &'a Config,
    fonts: &'a dyn FontMetricsProvider,
    options: DrawingOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, fonts: &'a dyn FontMetricsProvider) -> Self {
        Self {
            config,
            fonts,
            options: DrawingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DrawingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.laser.job_timeout_ms)
    }

    pub fn drawing(
        &self,
        template: &LamicoidTemplate,
        values: &VariableValues,
    ) -> std::result::Result<String, SerializeError> {
        let missing = template.missing_variables(values);
        if !missing.is_empty() {
            tracing::warn!("Using default values for variables: {}", missing.join(", "));
        }
        SvgRenderer::new(self.fonts)
            .with_options(self.options.clone())
            .render(template, values)
    }

    pub fn settings(&self, job_name: &str) -> std::result::Result<String, SerializeError> {
        job_settings(self.config, job_name).to_json()
    }

    fn model(&self) -> Result<DeviceModel> {
        self.config.laser.model().map_err(|e| Error::other(e.to_string()))
    }

    /// Serialize the label and generate its print file, blocking until the
    /// engine finishes or the configured timeout elapses.
    pub fn generate<E: PrintEngine>(
        &self,
        driver: &JobDriver<E>,
        template: &LamicoidTemplate,
        values: &VariableValues,
        fonts: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        let svg = self.drawing(template, values)?;
        let settings = self.settings(&template.name)?;
        let mut job = driver.create(&svg, &settings, self.model()?)?;
        for font in fonts {
            job.add_font_data(font)?;
        }
        let result = job.run_with_deadline(self.timeout(), log_progress)?;
        Ok(result.into_bytes()?)
    }

    /// As [`generate`](Self::generate), yielding to the async runtime
    /// between engine chunks.
    pub async fn generate_async<E: PrintEngine>(
        &self,
        driver: &JobDriver<E>,
        template: &LamicoidTemplate,
        values: &VariableValues,
        fonts: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        let svg = self.drawing(template, values)?;
        let settings = self.settings(&template.name)?;
        let mut job = driver.create(&svg, &settings, self.model()?)?;
        for font in fonts {
            job.add_font_data(font)?;
        }
        let result = job.run_cooperative(self.timeout(), log_progress).await?;
        Ok(result.into_bytes()?)
    }

    /// Send a print file to the configured engraver.
    pub fn dispatch<E: PrintEngine>(&self, engine: &E, payload: &[u8]) -> Result<()> {
        NetworkDispatcher::new(engine).try_send(
            self.model()?,
            payload,
            &self.config.laser.ip_address,
        )?;
        Ok(())
    }
}

fn log_progress(progress: &ProgressSnapshot) {
    tracing::debug!("Engine progress: {}", progress);
}
