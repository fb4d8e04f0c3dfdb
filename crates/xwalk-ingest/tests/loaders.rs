//! Integration tests for loading a complete reference directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use xwalk_ingest::{IngestError, ReferenceSources, load_reference_data};
use xwalk_model::{JobZone, OccupationCode, TaskId, WageCode};

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn reference_dir(with_ratings: bool) -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "Task Statements.txt",
        "O*NET-SOC Code\tTask ID\tTask\tTask Type\tIncumbents Responding\n\
         13-2011.00\t100\tPrepare financial reports.\tCore\t88\n\
         13-2011.01\t101\tPrepare financial reports.\tSupplemental\t40\n\
         15-1252.00\t200\tDebug software.\tCore\t91\n",
    );
    write(
        root,
        "Occupation Data.txt",
        "O*NET-SOC Code\tTitle\tDescription\n\
         13-2011.00\tAccountants and Auditors\tExamine financial statements.\n\
         13-2011.01\tAccountants\tAnalyze financial information.\n\
         15-1252.00\tSoftware Developers\tResearch and develop software.\n",
    );
    write(
        root,
        "Job Zones.txt",
        "O*NET-SOC Code\tTitle\tJob Zone\tDate\tDomain Source\n\
         13-2011.00\tAccountants and Auditors\t4\t08/2023\tAnalyst\n\
         15-1252.00\tSoftware Developers\t4\t08/2023\tAnalyst\n",
    );
    write(
        root,
        "Education, Training, and Experience.txt",
        "O*NET-SOC Code\tTitle\tElement ID\tElement Name\tScale ID\tCategory\tData Value\n\
         13-2011.00\tAccountants and Auditors\t2.D.1\tRequired Level of Education\tRL\t6\t71.2\n\
         13-2011.00\tAccountants and Auditors\t2.D.1\tRequired Level of Education\tRL\t8\t20.1\n",
    );
    if with_ratings {
        write(
            root,
            "Task Ratings.txt",
            "O*NET-SOC Code\tTask ID\tScale ID\tCategory\tData Value\n\
             13-2011.00\t100\tIM\tn/a\t4.10\n\
             15-1252.00\t200\tIM\tn/a\t4.75\n",
        );
    }
    write(
        root,
        "wages.csv",
        "OCC_CODE,OCC_TITLE,TOT_EMP,A_MEAN\n\
         00-0000,All Occupations,1000,50000\n\
         13-2011,Accountants and auditors,1400,90000\n",
    );
    dir
}

#[test]
fn loads_complete_reference_directory() {
    let dir = reference_dir(true);
    let sources = ReferenceSources::from_onet_dir(dir.path(), &dir.path().join("wages.csv"));
    assert!(sources.task_ratings.is_some());

    let data = load_reference_data(&sources).unwrap();
    assert_eq!(data.taxonomy.len(), 3);
    assert_eq!(data.taxonomy.occupation_count(), 3);

    let accountants = OccupationCode::new("13-2011.00").unwrap();
    assert_eq!(data.attributes.job_zone(&accountants), Some(JobZone(4)));
    assert_eq!(
        data.attributes.typical_education(&accountants).unwrap().category,
        6
    );
    assert_eq!(data.attributes.importance(&accountants, TaskId(100)), Some(4.10));

    assert_eq!(data.wages.len(), 1);
    assert!(data.wages.get(&WageCode::new("13-2011").unwrap()).is_some());
    assert!(data.wages.for_occupation(&accountants).is_some());
}

#[test]
fn task_ratings_are_optional() {
    let dir = reference_dir(false);
    let sources = ReferenceSources::from_onet_dir(dir.path(), &dir.path().join("wages.csv"));
    assert!(sources.task_ratings.is_none());

    let data = load_reference_data(&sources).unwrap();
    assert!(data.attributes.task_importance.is_empty());
    assert_eq!(sources.files().len(), 5);
}

#[test]
fn missing_reference_file_is_reported() {
    let dir = reference_dir(true);
    fs::remove_file(dir.path().join("Job Zones.txt")).unwrap();
    let sources = ReferenceSources::from_onet_dir(dir.path(), &dir.path().join("wages.csv"));

    let err = load_reference_data(&sources).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn fingerprints_cover_every_file() {
    let dir = reference_dir(true);
    let sources = ReferenceSources::from_onet_dir(dir.path(), &dir.path().join("wages.csv"));
    let fingerprints = sources.fingerprints().unwrap();
    let roles: Vec<_> = fingerprints.iter().map(|f| f.role.as_str()).collect();
    assert_eq!(
        roles,
        [
            "task_statements",
            "occupation_data",
            "job_zones",
            "education",
            "task_ratings",
            "wages"
        ]
    );
    assert!(fingerprints.iter().all(|f| f.sha256.len() == 64));
}
