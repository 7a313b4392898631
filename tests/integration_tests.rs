// Integration tests for the ab_statistics crate
// End-to-end flows: dataset file on disk -> aggregation -> z-test -> rendered report.

#[cfg(test)]
mod integration_tests {
    use ab_statistics::AbTestError;
    use ab_statistics::app::{Request, Screen, Upload, dispatch, power_input_from_percent};
    use ab_statistics::config::AnalysisConfig;
    use ab_statistics::data::{DatasetSummary, aggregate, load_path};
    use ab_statistics::testing::inference::ExperimentStatTests;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn experiment_csv(control: (u64, u64), treatment: (u64, u64)) -> String {
        let mut csv = String::from("user_id,variant,converted\n");
        let mut id = 0;
        let groups = [("control", control), ("treatment", treatment)];
        for (label, (observations, conversions)) in groups {
            for i in 0..observations {
                id += 1;
                let converted = u64::from(i < conversions);
                csv.push_str(&format!("{},{},{}\n", id, label, converted));
            }
        }
        csv
    }

    #[test]
    fn test_csv_file_to_test_result() {
        let file = write_csv(&experiment_csv((1000, 100), (1000, 150)));

        let rows = load_path(file.path()).unwrap();
        assert_eq!(rows.len(), 2000);

        let counts = aggregate(&rows).unwrap();
        assert_eq!(counts.control_observations, 1000);
        assert_eq!(counts.treatment_conversions, 150);

        let result = counts.evaluate(0.05).unwrap();
        assert!(result.p_value < 0.05);
        assert!(result.control_interval.contains(0.10));
        assert!(result.treatment_interval.contains(0.15));
    }

    #[test]
    fn test_automatic_screen_end_to_end() {
        let csv = experiment_csv((50, 5), (50, 6));
        let upload = Upload {
            file_name: "results.csv".to_string(),
            bytes: csv.into_bytes(),
        };
        let page = dispatch(&Request::AutomaticTest(upload), &AnalysisConfig::default()).unwrap();

        assert_eq!(page.screen, Screen::AutomaticTest);
        let text = page.to_string();
        assert!(text.contains(
            "There are 100 observations: 50 belong to the control group (around 50%)"
        ));
        assert!(text.contains(
            "There are 5 conversions in the control group and 6 in the treatment group."
        ));
        assert!(text.contains(
            "The conversion rate is around 10% in the control group and 12% in the treatment \
             group."
        ));
        assert!(text.contains("With a p-value of 0.749 we fail to reject"));
        assert!(text.contains("The confidence interval for the control group is [0.017, 0.183]."));
    }

    #[test]
    fn test_malformed_file_aborts_the_test() {
        let file = write_csv("id,group,converted\n1,control,1\n2,treatment,yes\n");
        let rows = load_path(file.path()).unwrap();
        match DatasetSummary::from_rows(&rows) {
            Err(AbTestError::Schema { row, message }) => {
                assert_eq!(row, Some(2));
                assert!(message.contains("yes"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_column_count_is_rejected() {
        let file = write_csv("id,group\n1,control\n");
        assert!(matches!(
            load_path(file.path()),
            Err(AbTestError::Schema { row: None, .. })
        ));
    }

    #[test]
    fn test_single_group_file_cannot_be_tested() {
        let csv = experiment_csv((20, 3), (0, 0));
        let upload = Upload {
            file_name: "only_control.csv".to_string(),
            bytes: csv.into_bytes(),
        };
        let err =
            dispatch(&Request::AutomaticTest(upload), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AbTestError::InvalidInput(_)));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_xlsx_fixture() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/experiment.xlsx");
        let rows = load_path(&path).unwrap();
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0], vec!["1", "control", "1"]);

        let summary = DatasetSummary::from_rows(&rows).unwrap();
        assert_eq!(summary.counts.control_observations, 10);
        assert_eq!(summary.counts.control_conversions, 3);
        assert_eq!(summary.counts.treatment_observations, 10);
        assert_eq!(summary.counts.treatment_conversions, 5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_path(std::path::Path::new("/nonexistent/experiment.csv")).unwrap_err();
        assert!(matches!(err, AbTestError::Io(_)));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_power_screen_from_percent_input() {
        let config = AnalysisConfig::default();
        let input = power_input_from_percent(0.20, 5.0, &config).unwrap();
        let page = dispatch(&Request::PowerAnalysis(input), &config).unwrap();
        assert_eq!(
            page.lines[0],
            "The required size to obtain an effect size of 5%, given an 80% power test and \
             significance level of 5% should at least consist of 1092 observations per group."
        );
    }
}
