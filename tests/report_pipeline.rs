use std::fs;

use zonal_report::bands::{band_colors, MISSING_SENTINEL};
use zonal_report::charts::{interactive_charts, ChartOutcome, PlotFormat, GROWTH_WARNING, TREND_WARNING};
use zonal_report::colormap::{normalize, Colormap};
use zonal_report::config::ReportConfig;
use zonal_report::map_export::{export_band_overlay, map_title};
use zonal_report::report::{render_report, report_charts};
use zonal_report::selection::{parse_column_list, ReportSelection};
use zonal_report::summary::ReportSummary;
use zonal_report::{ColumnKey, ObservationTable, SeriesKind, Zone};

const FIXTURE: &str = "\
Year,Glob,NHem,SHem,24N-90N,24S-24N,90S-24S,64N-90N,44N-64N,24N-44N,EQU-24N,24S-EQU,44S-24S,64S-44S,90S-64S
2019,.98,1.20,.76,1.50,.85,.70,2.90,1.60,1.10,.86,.84,.72,.40,.35
2020,1.01,1.28,.74,1.64,.82,.70,3.30,1.90,1.10,.82,.82,.74,.38,.10
2021,.85,1.10,.60,1.40,.60,.62,2.60,1.40,1.05,.62,.58,.70,.30,***
2022,.89,1.14,.65,1.46,.64,.68,2.40,1.50,1.15,.66,.62,.70,.44,.92
2023,1.17,1.43,.91,1.72,1.09,.80,2.70,1.70,1.40,1.10,1.08,.86,.48,.44
";

fn fixture() -> ObservationTable {
    ObservationTable::from_reader(FIXTURE.as_bytes()).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_derived_columns_follow_raw_values() {
    let table = fixture();
    for zone in Zone::all() {
        let raw = table.series(ColumnKey::raw(*zone));
        let diff = table.series(ColumnKey::diff(*zone));
        let accum = table.series(ColumnKey::accum(*zone));

        assert_eq!(diff[0], None);
        assert_eq!(accum[0], Some(0.0));
        for i in 1..table.len() {
            match (raw[i], raw[i - 1]) {
                (Some(a), Some(b)) => assert!(close(diff[i].unwrap(), a - b)),
                _ => assert_eq!(diff[i], None),
            }
            let step = diff[i].unwrap_or(0.0);
            assert!(close(accum[i].unwrap(), accum[i - 1].unwrap() + step));
        }
    }
}

#[test]
fn test_missing_cell_breaks_diff_but_not_accum() {
    let table = fixture();
    let row = table.row_for_year(2021).unwrap();
    assert_eq!(table.value(ColumnKey::raw(Zone::S90To64), row), None);
    assert_eq!(table.value(ColumnKey::diff(Zone::S90To64), row), None);
    assert_eq!(table.value(ColumnKey::diff(Zone::S90To64), row + 1), None);

    // 2020 adds -0.25, the 2021 and 2022 steps are dropped, 2023 adds -0.48
    let accum = table.value(ColumnKey::accum(Zone::S90To64), row + 2).unwrap();
    assert!(close(accum, -0.25 - 0.48));
}

#[test]
fn test_band_colors_for_last_year() {
    let table = fixture();
    let cmap = Colormap::balance();
    let bands = band_colors(&table, 2023, &cmap);

    assert_eq!(bands.len(), 8);
    assert_eq!(bands[0].zone, Zone::N64To90);
    assert_eq!(bands[7].zone, Zone::S90To64);
    assert!(bands.iter().all(|b| !b.missing));

    let arctic = &bands[0];
    assert!(close(arctic.value, 2.70 - 2.90));
    assert!(close(arctic.norm, normalize(arctic.value)));
    assert_eq!(arctic.color, cmap.sample(arctic.norm));
    assert!(!map_title(&bands, 2023).contains("no data"));
}

#[test]
fn test_year_without_row_uses_sentinel() {
    let table = fixture();
    let bands = band_colors(&table, 1990, &Colormap::balance());
    assert!(bands.iter().all(|b| b.missing && b.value == MISSING_SENTINEL));
    assert!(map_title(&bands, 1990).contains("no data"));
}

#[test]
fn test_selection_clamps_year_and_warns_on_empty() {
    let table = fixture();
    let mut selection = ReportSelection::defaults(&table).unwrap();
    assert_eq!(selection.year.value(), 2023);
    selection.year.set(1800);
    assert_eq!(selection.year.value(), 2019);

    selection.trend.clear();
    selection.growth.clear();
    let outcomes = interactive_charts(&selection);
    assert_eq!(outcomes[0], ChartOutcome::Warning(TREND_WARNING.to_string()));
    assert!(matches!(outcomes[1], ChartOutcome::Chart(_)));
    assert_eq!(outcomes[2], ChartOutcome::Warning(GROWTH_WARNING.to_string()));
    assert_eq!(report_charts(&selection).len(), 8);
}

#[test]
fn test_growth_list_accepts_diff_columns() {
    let keys = parse_column_list("Glob_diff, 64N-90N").unwrap();
    assert_eq!(keys[0].kind, SeriesKind::Diff);
    assert_eq!(keys[1], ColumnKey::raw(Zone::N64To90));
    assert!(parse_column_list("Glob,Mars").is_err());
}

#[test]
fn test_config_drives_selection() {
    let table = fixture();
    let config: ReportConfig = serde_json::from_str(
        r#"{ "trend_columns": ["NHem", "SHem"], "solo_column": "64N-90N", "year": 2020 }"#,
    )
    .unwrap();
    let selection = config.selection(&table).unwrap();
    assert_eq!(selection.trend.selected().len(), 2);
    assert_eq!(selection.solo.selected(), ColumnKey::raw(Zone::N64To90));
    assert_eq!(selection.year.value(), 2020);
}

#[test]
fn test_overlay_and_summary_written() {
    let dir = tempfile::tempdir().unwrap();
    let table = fixture();
    let selection = ReportSelection::defaults(&table).unwrap();
    let bands = band_colors(&table, 2023, &Colormap::balance());

    let overlay = dir.path().join("overlay.png");
    export_band_overlay(&bands, &overlay, 72, 36).unwrap();
    let img = image::open(&overlay).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (72, 36));

    let summary = ReportSummary::new(None, table.year_range(), &selection, &bands);
    let path = dir.path().join("summary.json");
    summary.write(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["bands"].as_array().unwrap().len(), 8);
    assert_eq!(json["selection"]["year"]["value"], 2023);
}

#[test]
fn test_report_includes_accumulated_comparison() {
    let table = fixture();
    let selection = ReportSelection::defaults(&table).unwrap();
    let accum: Vec<_> = report_charts(&selection)
        .into_iter()
        .filter_map(|c| match c {
            ChartOutcome::Chart(spec) if spec.keys().iter().all(|k| k.kind == SeriesKind::Accum) => Some(spec),
            _ => None,
        })
        .collect();
    assert_eq!(accum.len(), 1);
    assert_eq!(accum[0].series.len(), 8);
    assert!(!table.points(accum[0].series[0].key).is_empty());
}

const CHART_SLUGS: [&str; 8] = [
    "large_zones_trend",
    "northern_zones_trend",
    "multi_zone_trend",
    "solo_trend",
    "large_zones_growth",
    "northern_zones_growth",
    "multi_zone_growth",
    "narrow_zones_accum",
];

fn render_into(format: PlotFormat, empty_trend: bool) -> (tempfile::TempDir, zonal_report::report::ReportOutcome) {
    let dir = tempfile::tempdir().unwrap();
    let table = fixture();
    let mut selection = ReportSelection::defaults(&table).unwrap();
    if empty_trend {
        selection.trend.clear();
    }
    let config = ReportConfig {
        output_dir: dir.path().to_path_buf(),
        format,
        chart_size: (480, 320),
        map_size: (600, 380),
        overlay: true,
        overlay_size: (72, 36),
        ..Default::default()
    };
    let outcome = render_report(&table, &selection, &config, None).unwrap();
    (dir, outcome)
}

#[test]
fn test_render_report_writes_every_file() {
    for format in [PlotFormat::Svg, PlotFormat::Png] {
        let (dir, outcome) = render_into(format, false);
        let ext = format.extension();

        for slug in CHART_SLUGS {
            let path = dir.path().join(format!("{}.{}", slug, ext));
            assert!(path.is_file(), "missing {}", path.display());
            assert!(fs::metadata(&path).unwrap().len() > 0);
        }
        assert!(dir.path().join(format!("accumulated_map_2023.{}", ext)).is_file());
        assert!(dir.path().join("band_overlay_2023.png").is_file());
        assert!(dir.path().join("summary.json").is_file());
        assert_eq!(outcome.files.len(), 11);
        assert!(outcome.warnings.is_empty());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("summary.json")).unwrap()).unwrap();
        assert_eq!(json["files"].as_array().unwrap().len(), 10);
    }
}

#[test]
fn test_render_report_skips_empty_trend_chart() {
    let (dir, outcome) = render_into(PlotFormat::Svg, true);
    assert!(!dir.path().join("multi_zone_trend.svg").exists());
    assert!(dir.path().join("solo_trend.svg").is_file());
    assert_eq!(outcome.files.len(), 10);
    assert_eq!(outcome.warnings, vec![TREND_WARNING.to_string()]);
}
