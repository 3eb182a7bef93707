//! Shared fixtures: a Team/Member schema seeded with four members.

#![allow(dead_code)]

use rowql::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub name: String,
}

impl Team {
    pub const NAME_FIELD: Path<String> = Path::new("name");

    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

impl Entity for Team {
    const NAME: &'static str = "Team";

    fn definition() -> EntityDef {
        EntityDef::new(Self::NAME).with_field(FieldDef::scalar("name", ScalarType::String))
    }

    fn to_fields(&self) -> Vec<(String, Value)> {
        vec![("name".into(), self.name.clone().into())]
    }

    fn from_record(record: &Record) -> Result<Self, Error> {
        Ok(Self {
            name: record.get_as("name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub username: Option<String>,
    pub age: i32,
    pub team: Option<RecordId>,
}

impl Member {
    pub const USERNAME: Path<Option<String>> = Path::new("username");
    pub const AGE: Path<i32> = Path::new("age");
    pub const TEAM: Path<Option<RecordId>> = Path::new("team");

    pub fn new(username: Option<&str>, age: i32, team: Option<RecordId>) -> Self {
        Self {
            username: username.map(str::to_string),
            age,
            team,
        }
    }
}

impl Entity for Member {
    const NAME: &'static str = "Member";

    fn definition() -> EntityDef {
        EntityDef::new(Self::NAME)
            .with_field(FieldDef::optional_scalar("username", ScalarType::String))
            .with_field(FieldDef::scalar("age", ScalarType::Int32))
            .with_field(FieldDef::reference("team", Team::NAME))
    }

    fn to_fields(&self) -> Vec<(String, Value)> {
        vec![
            ("username".into(), self.username.clone().into()),
            ("age".into(), self.age.into()),
            ("team".into(), self.team.into()),
        ]
    }

    fn from_record(record: &Record) -> Result<Self, Error> {
        Ok(Self {
            username: record.get_as("username")?,
            age: record.get_as("age")?,
            team: record.get_as("team")?,
        })
    }
}

pub struct Fixture {
    pub db: Database,
    pub team_a: RecordId,
    pub team_b: RecordId,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

pub fn catalog() -> Catalog {
    Catalog::new()
        .with_entity_type::<Team>()
        .with_entity_type::<Member>()
}

/// Seed teamA with member1 and member2, teamB with member3 and member4.
pub fn seed(db: &Database) -> (RecordId, RecordId) {
    let team_a = db.persist(&Team::new("teamA")).unwrap();
    let team_b = db.persist(&Team::new("teamB")).unwrap();

    for (username, age, team) in [
        ("member1", 10, team_a),
        ("member2", 20, team_a),
        ("member3", 30, team_b),
        ("member4", 40, team_b),
    ] {
        db.persist(&Member::new(Some(username), age, Some(team)))
            .unwrap();
    }
    (team_a, team_b)
}

pub fn setup() -> Fixture {
    init_tracing();
    let db = Database::open(catalog()).unwrap();
    let (team_a, team_b) = seed(&db);
    Fixture { db, team_a, team_b }
}

pub fn usernames(members: &[Member]) -> Vec<Option<&str>> {
    members.iter().map(|m| m.username.as_deref()).collect()
}
