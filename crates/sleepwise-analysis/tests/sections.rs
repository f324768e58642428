use std::{fs, io::Write as _, path::PathBuf};

use approx::assert_relative_eq;
use sleepwise_analysis::{
    error::{AnalysisError, LoadError},
    loader::{DataSource, DatasetLoader, LoaderConfig},
    result::StatValue,
    schema::ColumnRole,
    section::{Analysis, AnalysisConfig, Section},
};
use sleepwise_stats::StatsError;

const SURVEY: &str = "\
Sex,Year,Age,Weekly_Sleep_Duration,psqi_2_groups,MEQ,Trait_Anxiety,Notes,PSQI_Score,Sleep_Category,Start_time_code,Daytime_Dozing
F,1,19,50,1,62,38,,3,Good Sleep,1,0
M,2,20,45,2,45,55,,9,Poor Sleep,3,2
F,1,18,52,1,58,NA,,4,Good Sleep,2,0
F,3,21,40,2,35,60,,12,Poor Sleep,4,3
M,2,19,48,1,40,42,,5,Good Sleep,2,1
F,1,20,38,2,30,58,,11,Poor Sleep,5,2
M,4,22,55,1,66,35,,2,Good Sleep,1,0
F,2,19,42,2,52,,,8,Poor Sleep,3,1
M,3,21,47,2,38,50,,7,Poor Sleep,4,2
F,1,18,51,1,61,40,,1,Good Sleep,2,0
";

fn write_survey(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "sleepwise-sections-{}-{name}.csv",
        std::process::id()
    ));
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn load(name: &str, contents: &str) -> Analysis {
    let path = write_survey(name, contents);
    let mut loader = DatasetLoader::new(LoaderConfig::default());
    let dataset = loader.load(&DataSource::Path(path.clone())).unwrap();
    fs::remove_file(path).unwrap();
    Analysis::new(dataset, AnalysisConfig::default())
}

#[test]
fn test_full_survey_runs_every_section() {
    let analysis = load("full", SURVEY);
    let reports = analysis.run_all();
    assert_eq!(reports.len(), 3);
    for report in &reports {
        assert_eq!(report.records, 10);
        let skipped = report.skipped().map(|item| &item.title).collect::<Vec<_>>();
        assert!(skipped.is_empty(), "{}: {skipped:?}", report.section);
    }

    let corr = reports[0]
        .item("Correlation psqi vs trait_anxiety")
        .and_then(|item| item.result())
        .unwrap();
    let StatValue::Correlation(corr) = &corr.value else {
        panic!("unexpected statistic {}", corr.name());
    };
    assert_eq!(corr.n, 8);
}

#[test]
fn test_correlation_matrix_is_symmetric() {
    let analysis = load("matrix", SURVEY);
    let report = analysis.run(Section::StartTimeAndMatrix);
    let result = report
        .item("Correlation matrix")
        .and_then(|item| item.result())
        .unwrap();
    let StatValue::CorrelationMatrix(matrix) = &result.value else {
        panic!("unexpected statistic {}", result.name());
    };
    assert_eq!(matrix.columns, ColumnRole::NUMERIC.map(ColumnRole::id));
    for (i, row) in matrix.values.iter().enumerate() {
        assert_relative_eq!(row[i], 1.0);
        for (j, value) in row.iter().enumerate() {
            assert_eq!(value.to_bits(), matrix.values[j][i].to_bits());
        }
    }
}

#[test]
fn test_start_time_chart_data() {
    let analysis = load("start-time", SURVEY);
    let report = analysis.run(Section::StartTimeAndMatrix);

    let result = report
        .item("start_time x chronotype_category")
        .and_then(|item| item.result())
        .unwrap();
    let StatValue::Crosstab(table) = &result.value else {
        panic!("unexpected statistic {}", result.name());
    };
    let rows = table.rows.iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(rows, ["1", "2", "3", "4", "5"]);
    let columns = table.columns.iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_eq!(columns, ["Morning Type", "Intermediate Type", "Evening Type"]);

    let result = report
        .item("trait_anxiety vs psqi by start_time")
        .and_then(|item| item.result())
        .unwrap();
    let StatValue::Scatter(scatter) = &result.value else {
        panic!("unexpected statistic {}", result.name());
    };
    assert_eq!(result.columns, ["psqi", "trait_anxiety", "start_time"]);
    let first = &scatter.points[0];
    assert_eq!((first.x, first.y), (3.0, 38.0));
}

#[test]
fn test_missing_column_skips_only_its_items() {
    let without_start_time = SURVEY
        .lines()
        .map(|line| {
            let mut fields = line.split(',').collect::<Vec<_>>();
            fields.remove(10);
            fields.join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");
    let analysis = load("no-start-time", &without_start_time);
    assert!(!analysis.dataset().has_column(ColumnRole::StartTime));

    let report = analysis.run(Section::StartTimeAndMatrix);
    let not_found = AnalysisError::ColumnNotFound {
        column: "start_time".to_owned(),
    };
    for title in [
        "start_time x chronotype_category",
        "trait_anxiety vs psqi by start_time",
        "Correlation start_time vs psqi",
        "Correlation start_time vs trait_anxiety",
        "Correlation matrix: start_time",
    ] {
        let item = report.item(title).unwrap();
        assert_eq!(item.skip_reason(), Some(&not_found), "{title}");
    }
    assert!(
        report
            .item("Correlation psqi vs daytime_dozing")
            .unwrap()
            .result()
            .is_some()
    );
    assert!(report.item("Correlation matrix").unwrap().result().is_some());
}

#[test]
fn test_single_group_comparison_is_skipped() {
    let all_good = "\
PSQI_Score,Trait_Anxiety,MEQ
2,38,62
3,41,50
4,45,39
";
    let analysis = load("single-group", all_good);
    let report = analysis.run(Section::GroupComparisons);
    let item = report
        .item("Welch test of trait_anxiety by sleep_quality")
        .unwrap();
    assert_eq!(
        item.skip_reason(),
        Some(&AnalysisError::from(StatsError::InvalidGrouping { groups: 1 }))
    );
}

#[test]
fn test_schema_mismatch_is_fatal() {
    let path = write_survey("schema", "Sex,Age\nF,19\n");
    let mut loader = DatasetLoader::default();
    let err = loader.load(&DataSource::Path(path.clone())).unwrap_err();
    fs::remove_file(path).unwrap();
    assert_eq!(
        err,
        LoadError::SchemaMismatch {
            missing: vec![
                "MEQ".to_owned(),
                "Trait_Anxiety".to_owned(),
                "PSQI_Score".to_owned()
            ]
        }
    );
}

#[test]
fn test_report_serializes() {
    let analysis = load("json", SURVEY);
    let report = analysis.run(Section::GroupComparisons);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["number"], 2);
    assert_eq!(json["items"][0]["status"], "computed");
    assert_eq!(json["items"][0]["result"]["statistic"], "group_summaries");
}
