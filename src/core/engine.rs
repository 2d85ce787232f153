use crate::core::advisor::{fertilizer_prompt, improvement_prompt, yield_prompt};
use crate::core::catalog::CropCatalog;
use crate::core::report::ReportRenderer;
use crate::core::scorer;
use crate::domain::model::{
    Coordinates, CropMatch, CropRequirement, Report, Resolution, SoilConditions,
    SuitabilityVerdict,
};
use crate::domain::ports::{Advisor, LocationResolver, Storage};
use crate::utils::error::Result;
use std::path::Path;

pub const REPORT_TITLE: &str = "Crop Suggestion Report";

#[derive(Debug, Clone)]
pub struct Suggestion<'a> {
    pub conditions: SoilConditions,
    pub matches: Vec<CropMatch<'a>>,
    pub report: Report,
}

#[derive(Debug, Clone)]
pub struct CropInfo<'a> {
    pub crop: &'a CropRequirement,
    pub report: Report,
}

#[derive(Debug, Clone)]
pub struct SuitabilityCheck<'a> {
    pub crop: &'a CropRequirement,
    pub conditions: SoilConditions,
    pub score: u8,
    pub verdict: SuitabilityVerdict,
    pub report: Report,
}

/// Where the scored conditions came from.
#[derive(Debug, Clone)]
pub struct ResolvedConditions {
    pub conditions: SoilConditions,
    pub resolution: Option<Resolution>,
}

impl ResolvedConditions {
    pub fn from_location(&self) -> bool {
        matches!(self.resolution, Some(Resolution::Found(_)))
    }
}

pub struct AdvisorEngine<A: Advisor, L: LocationResolver, S: Storage> {
    catalog: CropCatalog,
    advisor: A,
    locator: L,
    storage: S,
    renderer: ReportRenderer,
    output_path: String,
    report_filename: String,
}

impl<A: Advisor, L: LocationResolver, S: Storage> AdvisorEngine<A, L, S> {
    pub fn new(catalog: CropCatalog, advisor: A, locator: L, storage: S) -> Self {
        Self {
            catalog,
            advisor,
            locator,
            storage,
            renderer: ReportRenderer::new(),
            output_path: ".".to_string(),
            report_filename: "crop_suggestion.pdf".to_string(),
        }
    }

    pub fn with_output(mut self, output_path: impl Into<String>, report_filename: impl Into<String>) -> Self {
        self.output_path = output_path.into();
        self.report_filename = report_filename.into();
        self
    }

    pub fn with_renderer(mut self, renderer: ReportRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn catalog(&self) -> &CropCatalog {
        &self.catalog
    }

    /// Uses location data when requested and available, otherwise the manual values.
    pub async fn resolve_conditions(
        &self,
        manual: SoilConditions,
        use_location: bool,
        coordinates: Option<Coordinates>,
    ) -> ResolvedConditions {
        if !use_location {
            return ResolvedConditions {
                conditions: manual,
                resolution: None,
            };
        }

        let resolution = self.locator.resolve(coordinates).await;
        let conditions = match &resolution {
            Resolution::Found(reading) => {
                tracing::info!(
                    "✅ Location detected: {} (soil {}, moisture {}%, {}°C)",
                    reading.district,
                    reading.soil_type,
                    reading.moisture,
                    reading.temperature
                );
                reading.conditions()
            }
            Resolution::NotFound(reason) => {
                tracing::warn!("⚠️ Could not fetch complete data for this location: {}", reason);
                manual
            }
        };

        ResolvedConditions {
            conditions,
            resolution: Some(resolution),
        }
    }

    pub async fn suggest(&self, conditions: SoilConditions, with_advice: bool) -> Suggestion<'_> {
        let matches = scorer::rank(&self.catalog, &conditions);
        tracing::info!("🌱 Top {} crop suggestions computed", matches.len());

        let advice = self.advice(&yield_prompt(&conditions), with_advice).await;
        let report = Report {
            title: REPORT_TITLE.to_string(),
            user_input: conditions_text(&conditions),
            match_data: Some(format_matches(&matches)),
            advice,
        };

        Suggestion {
            conditions,
            matches,
            report,
        }
    }

    pub async fn crop_info(&self, crop_name: &str, with_advice: bool) -> Result<CropInfo<'_>> {
        let crop = self.catalog.get(crop_name)?;

        let advice = self.advice(&fertilizer_prompt(crop), with_advice).await;
        let report = Report {
            title: REPORT_TITLE.to_string(),
            user_input: format!("Crop: {}", crop.name),
            match_data: Some(requirement_summary(crop)),
            advice,
        };

        Ok(CropInfo { crop, report })
    }

    pub async fn check(
        &self,
        crop_name: &str,
        conditions: SoilConditions,
        with_advice: bool,
    ) -> Result<SuitabilityCheck<'_>> {
        let crop = self.catalog.get(crop_name)?;
        let score = scorer::suitability_score(crop, &conditions);
        let verdict = scorer::verdict(score);
        tracing::info!("🔎 {} scored {}% ({})", crop.name, score, verdict);

        let advice = self
            .advice(&improvement_prompt(crop, &conditions), with_advice)
            .await;
        let report = Report {
            title: REPORT_TITLE.to_string(),
            user_input: format!("Crop: {}\n{}", crop.name, conditions_text(&conditions)),
            match_data: Some(verdict.to_string()),
            advice,
        };

        Ok(SuitabilityCheck {
            crop,
            conditions,
            score,
            verdict,
            report,
        })
    }

    /// Renders the report and writes it through storage. Returns the output path.
    pub async fn save_report(&self, report: &Report) -> Result<String> {
        let pdf = self.renderer.render(report)?;
        tracing::debug!("Writing report ({} bytes) to storage", pdf.len());
        self.storage.write_file(&self.report_filename, &pdf).await?;
        Ok(Path::new(&self.output_path)
            .join(&self.report_filename)
            .display()
            .to_string())
    }

    async fn advice(&self, prompt: &str, with_advice: bool) -> String {
        if !with_advice {
            return "AI suggestion skipped.".to_string();
        }
        tracing::debug!("Advisor prompt: {}", prompt);
        self.advisor.advise(prompt).await
    }
}

pub fn conditions_text(conditions: &SoilConditions) -> String {
    format!(
        "Soil Type: {}\nMoisture: {}%\nTemperature: {}°C",
        conditions.soil, conditions.moisture, conditions.temperature
    )
}

/// Requirement lines for the crop info report. Rainfall is only shown on screen.
pub fn requirement_summary(crop: &CropRequirement) -> String {
    format!(
        "Preferred Soil: {}\nIdeal Moisture Level: {}%\nTemperature Range: {}",
        crop.soil_list(),
        crop.ideal_moisture_percent,
        crop.temperature_label()
    )
}

/// Fixed-width table of ranked crops.
pub fn format_matches(matches: &[CropMatch<'_>]) -> String {
    let mut lines = vec![format!(
        "{:<16} {:>5} {:>9}  {:<30} {}",
        "Crop", "Score", "Moisture", "Preferred Soil Types", "Temp (C)"
    )];
    for m in matches {
        lines.push(format!(
            "{:<16} {:>5} {:>8}%  {:<30} {}",
            m.crop.name,
            m.score,
            m.crop.ideal_moisture_percent,
            m.crop.soil_list(),
            m.crop.temperature_label()
        ));
    }
    lines.join("\n")
}
