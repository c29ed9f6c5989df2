//! Run-once monitoring pipeline.
//!
//! species → occurrence location → imagery walk → NDVI → PNG output

use std::path::PathBuf;

use anyhow::{Context, Result};
use biodiversity::{OccurrenceClient, RedListClient, SpeciesStore};
use chrono::NaiveDate;
use futures::{pin_mut, Stream, StreamExt};
use habitat_common::Coordinate;
use imagery::{HttpImagerySource, ImageSample, ImageryFetcher};
use tracing::{info, instrument, warn};
use vegetation::{IndexSummary, NdviCalculator};

use crate::config::MonitorConfig;
use crate::output::OutputWriter;

/// Command-line choices that take precedence over provider lookups.
#[derive(Debug, Clone, Default)]
pub struct RunSelection {
    /// Analyse this species instead of the first stored registry record.
    pub species: Option<String>,
    /// Analyse this location instead of looking up occurrences.
    pub location: Option<Coordinate>,
    /// Log the species' recorded habitats before fetching imagery.
    pub show_habitats: bool,
}

/// Outcome for one retrieved image.
#[derive(Debug, Clone)]
pub struct SampleReport {
    pub date: NaiveDate,
    pub image_path: PathBuf,
    pub ndvi_path: PathBuf,
    pub summary: Option<IndexSummary>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub species: String,
    pub location: Coordinate,
    pub steps_requested: usize,
    pub samples: Vec<SampleReport>,
}

impl RunSummary {
    pub fn steps_skipped(&self) -> usize {
        self.steps_requested.saturating_sub(self.samples.len())
    }
}

/// Execute one full monitoring run.
pub async fn run(config: &MonitorConfig, selection: &RunSelection) -> Result<RunSummary> {
    let species = resolve_species(config, selection).await?;
    info!(species = %species, "Selected species");

    if selection.show_habitats {
        log_habitats(config, &species).await;
    }

    let location = resolve_location(config, selection, &species).await?;
    let range = config.run.date_range()?;

    let source = HttpImagerySource::new(&config.imagery.source)
        .context("Failed to build imagery client")?;
    let fetcher = ImageryFetcher::new(Box::new(source), config.imagery.fetcher.clone())
        .context("Failed to build imagery fetcher")?;
    let calculator = config.ndvi.calculator()?;
    let writer = OutputWriter::create(&config.run.output_dir)?;

    let steps_requested = fetcher.step_count(&range);
    let samples = process_samples(fetcher.fetch(location, range), &calculator, &writer).await?;

    if samples.is_empty() {
        warn!(
            species = %species,
            location = %location,
            steps = steps_requested,
            "No imagery retrieved for the monitoring window"
        );
    }

    let summary = RunSummary {
        species,
        location,
        steps_requested,
        samples,
    };

    info!(
        species = %summary.species,
        location = %summary.location,
        requested = summary.steps_requested,
        retrieved = summary.samples.len(),
        skipped = summary.steps_skipped(),
        output_dir = %writer.dir().display(),
        "Monitoring run complete"
    );

    Ok(summary)
}

/// Compute NDVI for every sample in date order and write both PNGs.
pub async fn process_samples<S>(
    samples: S,
    calculator: &NdviCalculator,
    writer: &OutputWriter,
) -> Result<Vec<SampleReport>>
where
    S: Stream<Item = ImageSample>,
{
    pin_mut!(samples);
    let mut reports = Vec::new();

    while let Some(sample) = samples.next().await {
        let ndvi = calculator
            .compute(&sample.pixels)
            .with_context(|| format!("NDVI computation failed for {}", sample.date))?;

        let image_path = writer.save_sample(&sample)?;
        let ndvi_path = writer.save_ndvi(sample.date, &ndvi)?;
        let summary = ndvi.summary();

        match &summary {
            Some(s) => info!(
                date = %sample.date,
                mean = s.mean,
                min = s.min,
                max = s.max,
                vegetated_fraction = s.vegetated_fraction,
                "Average NDVI"
            ),
            None => warn!(date = %sample.date, "Empty image, no NDVI statistics"),
        }

        reports.push(SampleReport {
            date: sample.date,
            image_path,
            ndvi_path,
            summary,
        });
    }

    Ok(reports)
}

#[instrument(skip(config, selection))]
async fn resolve_species(config: &MonitorConfig, selection: &RunSelection) -> Result<String> {
    if let Some(name) = &selection.species {
        return Ok(name.clone());
    }

    let store = SpeciesStore::new(&config.run.species_file);
    if !store.exists() {
        anyhow::ensure!(
            !config.redlist.token.is_empty(),
            "No species file at {} and no registry token configured (set REDLIST_TOKEN)",
            store.path().display()
        );

        info!(path = %store.path().display(), "Species file missing, downloading registry");
        let client = RedListClient::new(config.redlist.clone())?;
        let records = client
            .fetch_all_species()
            .await
            .context("Failed to download endangered species registry")?;
        anyhow::ensure!(
            !records.is_empty(),
            "Endangered species registry returned no records, not writing {}",
            store.path().display()
        );
        store.append(&records)?;
    }

    let records = store.load()?;
    let first = records
        .into_iter()
        .next()
        .with_context(|| format!("No species records in {}", store.path().display()))?;

    Ok(first.scientific_name)
}

async fn log_habitats(config: &MonitorConfig, species: &str) {
    let habitats = match RedListClient::new(config.redlist.clone()) {
        Ok(client) => client.habitats(species).await,
        Err(e) => Err(e),
    };

    match habitats {
        Ok(habitats) => info!(species, ?habitats, "Recorded habitats"),
        Err(e) => warn!(species, error = %e, "Habitat lookup failed"),
    }
}

#[instrument(skip(config, selection))]
async fn resolve_location(
    config: &MonitorConfig,
    selection: &RunSelection,
    species: &str,
) -> Result<Coordinate> {
    if let Some(location) = selection.location {
        return Ok(location);
    }

    let client = OccurrenceClient::new(config.occurrence.clone())?;
    let locations = client
        .species_locations(species)
        .await
        .with_context(|| format!("Occurrence lookup failed for {}", species))?;

    anyhow::ensure!(!locations.is_empty(), "No locations found for {}", species);

    let index = config.run.location_index;
    let location = locations.get(index).copied().with_context(|| {
        format!(
            "location_index {} out of range, {} locations found for {}",
            index,
            locations.len(),
            species
        )
    })?;

    info!(location = %location, index, total = locations.len(), "Selected location");
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use test_utils::{create_band_grid, create_gradient_grid, fixture_date};

    #[tokio::test]
    async fn test_process_samples_writes_both_files_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::create(dir.path()).unwrap();
        let samples = vec![
            ImageSample {
                date: fixture_date("2023-01-01"),
                pixels: create_band_grid(4, 4, 200, 50),
            },
            ImageSample {
                date: fixture_date("2023-01-17"),
                pixels: create_gradient_grid(6, 3),
            },
        ];

        let reports = process_samples(stream::iter(samples), &NdviCalculator::default(), &writer)
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].date, fixture_date("2023-01-01"));
        for report in &reports {
            assert!(report.image_path.is_file());
            assert!(report.ndvi_path.is_file());
        }
        let mean = reports[0].summary.unwrap().mean;
        test_utils::assert_approx_eq!(mean, 0.6, 1e-9);
    }

    #[tokio::test]
    async fn test_process_samples_empty_stream() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::create(dir.path()).unwrap();

        let reports = process_samples(
            stream::empty::<ImageSample>(),
            &NdviCalculator::default(),
            &writer,
        )
        .await
        .unwrap();

        assert!(reports.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_steps_skipped() {
        let summary = RunSummary {
            species: "Aaadonta angaurana".to_string(),
            location: Coordinate::new(6.9061, 134.1372).unwrap(),
            steps_requested: 6,
            samples: Vec::new(),
        };
        assert_eq!(summary.steps_skipped(), 6);
    }
}
