//! Shared fixtures for unit tests.

use crate::dataset::Dataset;
use crate::schema::{FeatureRecord, FeatureSchema};
use crate::training::{train, TrainedModel, TrainingParams};
use crate::types::PassengerRecord;

/// 40 non-survivors (30 identical to [`victim_record`]), 20 survivors and two unlabelled rows.
pub fn scenario_csv() -> String {
    let mut csv = String::from("Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked\n");
    for _ in 0..30 {
        csv.push_str("0,3,male,30,0,0,7.25,S\n");
    }
    let other_victims = [
        "0,3,male,22,1,0,7.25,S",
        "0,3,male,35,0,0,8.05,S",
        "0,3,male,,0,0,8.4583,Q",
        "0,2,male,54,0,0,12.0,S",
        "0,3,male,19,0,0,7.8958,S",
        "0,3,male,40,1,0,9.5,S",
        "0,2,male,27,0,0,13.0,S",
        "0,3,male,26,0,0,7.775,Q",
        "0,3,male,44,0,1,8.05,S",
        "0,3,male,31,0,0,7.925,S",
    ];
    let survivors = [
        "1,1,female,38,1,0,71.2833,C",
        "1,1,female,35,1,0,53.1,S",
        "1,1,female,58,0,0,26.55,S",
        "1,1,female,24,0,0,69.3,C",
        "1,1,female,49,1,0,76.7292,C",
        "1,1,female,23,1,0,113.275,C",
        "1,1,female,,0,0,86.5,S",
        "1,1,female,47,1,1,52.5542,S",
        "1,1,female,30,0,0,93.5,S",
        "1,1,female,39,1,1,83.1583,C",
        "1,1,female,50,0,1,247.5208,C",
        "1,1,female,62,0,0,80.0,",
        "1,1,female,33,0,0,151.55,S",
        "1,1,female,21,0,0,77.9583,S",
        "1,1,female,29,0,0,211.3375,S",
        "1,1,female,44,0,1,57.9792,C",
        "1,1,female,36,1,0,120.0,S",
        "1,1,female,17,1,0,108.9,C",
        "1,1,female,52,1,1,93.5,S",
        "1,1,female,41,0,0,134.5,C",
    ];
    for line in other_victims.iter().chain(survivors.iter()) {
        csv.push_str(line);
        csv.push('\n');
    }
    csv.push_str(",3,male,28,0,0,7.75,Q\n");
    csv.push_str(",1,female,,1,0,90.0,C\n");
    csv
}

pub fn scenario_dataset() -> Dataset {
    Dataset::from_reader(scenario_csv().as_bytes()).expect("fixture csv parses")
}

pub fn trained_scenario_model() -> TrainedModel {
    train(
        &scenario_dataset(),
        &FeatureSchema::titanic(),
        "Survived",
        TrainingParams::default(),
    )
    .expect("fixture trains")
}

/// `{3, male, 30, 0, 0, 7.25, S}`
pub fn victim_record() -> FeatureRecord {
    PassengerRecord::default().to_record()
}

pub fn survivor_passenger() -> PassengerRecord {
    PassengerRecord {
        pclass: 1,
        sex: "female".to_string(),
        age: 35.0,
        sibsp: 1,
        parch: 0,
        fare: 80.0,
        embarked: "C".to_string(),
    }
}

pub fn survivor_record() -> FeatureRecord {
    survivor_passenger().to_record()
}
