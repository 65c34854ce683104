//! Integration tests for the flexfields CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

// Person declares a relation "pets" that is missing from its field list.
const INVALID_SCHEMA: &str = r#"{
    "Pet": {
        "fields": ["id", "url", "name", "toys", "species", "owner"],
        "links": ["url"],
        "relations": {
            "owner": { "target": "Person", "reference": true }
        }
    },
    "Person": {
        "fields": ["id", "url", "name", "employer"],
        "links": ["url"],
        "relations": {
            "employer": { "target": "Company", "reference": true },
            "pets": { "target": "Pet", "kind": "to_many" }
        }
    },
    "Company": {
        "fields": ["id", "url", "name"],
        "links": ["url"]
    }
}"#;

const PET: &str = r#"{
    "id": 1,
    "url": "/pets/1",
    "name": "Garfield",
    "toys": "paper ball",
    "species": "cat",
    "owner": {
        "id": 2,
        "url": "/people/2",
        "name": "Jon",
        "employer": { "id": 3, "url": "/companies/3", "name": "McBurger" }
    }
}"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

fn cmd() -> Command {
    Command::cargo_bin("flexfields").unwrap()
}

const VALID_SCHEMA: &str = r#"{
    "Pet": {
        "fields": ["id", "url", "name", "toys", "species", "owner"],
        "links": ["url"],
        "relations": {
            "owner": { "target": "Person", "reference": true }
        }
    },
    "Person": {
        "fields": ["id", "url", "name", "employer"],
        "links": ["url"],
        "relations": {
            "employer": { "target": "Company", "reference": true }
        }
    },
    "Company": {
        "fields": ["id", "url", "name"],
        "links": ["url"]
    }
}"#;

mod render_command {
    use super::*;

    #[test]
    fn sparse_fields() {
        let schema = write_temp(VALID_SCHEMA);
        let object = write_temp(PET);

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet", "--fields", "name,toys"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"name":"Garfield","toys":"paper ball"}"#,
            ));
    }

    #[test]
    fn expansion_with_nested_fields() {
        let schema = write_temp(VALID_SCHEMA);
        let object = write_temp(PET);

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(schema.path())
            .args([
                "--type",
                "Pet",
                "--expand",
                "owner.employer",
                "--fields",
                "owner.employer.name",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"owner":{"employer":{"name":"McBurger"}}}"#,
            ));
    }

    #[test]
    fn identifier_mode() {
        let schema = write_temp(VALID_SCHEMA);
        let object = write_temp(PET);

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet", "--fields", "owner", "--identifier", "id"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"owner":2}"#));
    }

    #[test]
    fn unknown_identifier_exits_2() {
        let schema = write_temp(VALID_SCHEMA);
        let object = write_temp(PET);

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet", "--identifier", "slug"])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("unknown identifier"));
    }

    #[test]
    fn pretty_output() {
        let schema = write_temp(VALID_SCHEMA);
        let object = write_temp(PET);

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet", "--fields", "name", "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains("{\n  \"name\": \"Garfield\"\n}"));
    }

    #[test]
    fn output_file() {
        let schema = write_temp(VALID_SCHEMA);
        let object = write_temp(PET);
        let out = NamedTempFile::new().unwrap();

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet", "--fields", "name"])
            .arg("--output")
            .arg(out.path())
            .assert()
            .success();

        let written = std::fs::read_to_string(out.path()).unwrap();
        assert_eq!(written, r#"{"name":"Garfield"}"#);
    }

    #[test]
    fn missing_object_file_exits_3() {
        let schema = write_temp(VALID_SCHEMA);

        cmd()
            .arg("render")
            .arg("/nonexistent/pet.json")
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet"])
            .assert()
            .failure()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn unknown_type_exits_2() {
        let schema = write_temp(VALID_SCHEMA);
        let object = write_temp(PET);

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Zebra"])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("unknown type 'Zebra'"));
    }
}

mod plan_command {
    use super::*;

    #[test]
    fn join_hint_for_to_one_chain() {
        let schema = write_temp(VALID_SCHEMA);

        cmd()
            .arg("plan")
            .args(["owner.employer"])
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet"])
            .assert()
            .success()
            .stdout(predicate::str::contains("select_related: owner__employer"));
    }

    #[test]
    fn json_output() {
        let schema = write_temp(VALID_SCHEMA);

        cmd()
            .arg("plan")
            .args(["owner"])
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""select_related""#))
            .stdout(predicate::str::contains(r#""owner""#));
    }

    #[test]
    fn slug_identifier_adds_root_hints() {
        let schema = write_temp(VALID_SCHEMA);

        cmd()
            .arg("plan")
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Pet", "--identifier", "name"])
            .assert()
            .success()
            .stdout(predicate::str::contains("select_related: owner"));
    }

    #[test]
    fn no_hints_message() {
        let schema = write_temp(VALID_SCHEMA);

        cmd()
            .arg("plan")
            .arg("--schema")
            .arg(schema.path())
            .args(["--type", "Company"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No eager-load hints."));
    }
}

mod check_command {
    use super::*;

    #[test]
    fn valid_schema_passes() {
        let schema = write_temp(VALID_SCHEMA);

        cmd()
            .arg("check")
            .arg(schema.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("OK: 3 type(s)"))
            .stdout(predicate::str::contains("Company, Person, Pet"));
    }

    #[test]
    fn undeclared_relation_exits_2() {
        let schema = write_temp(INVALID_SCHEMA);

        cmd()
            .arg("check")
            .arg(schema.path())
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("pets"));
    }

    #[test]
    fn unknown_target_exits_2() {
        let schema = write_temp(
            r#"{
                "Pet": {
                    "fields": ["id", "owner"],
                    "relations": { "owner": { "target": "Person" } }
                }
            }"#,
        );

        cmd()
            .arg("check")
            .arg(schema.path())
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("unknown type 'Person'"));
    }

    #[test]
    fn expansion_cycle_exits_2() {
        let schema = write_temp(
            r#"{
                "Pet": {
                    "fields": ["owner"],
                    "relations": { "owner": { "target": "Person", "forced": true } }
                },
                "Person": {
                    "fields": ["pet"],
                    "relations": { "pet": { "target": "Pet", "forced": true } }
                }
            }"#,
        );

        cmd()
            .arg("check")
            .arg(schema.path())
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("expansion cycle"));
    }

    #[test]
    fn invalid_json_exits_2() {
        let schema = write_temp("not json at all");

        cmd()
            .arg("check")
            .arg(schema.path())
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn missing_file_exits_3() {
        cmd()
            .arg("check")
            .arg("/nonexistent/schema.json")
            .assert()
            .failure()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }
}

#[cfg(feature = "remote")]
mod remote_schema {
    use super::*;

    #[test]
    fn render_with_remote_schema() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/schema.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(VALID_SCHEMA)
            .create();
        let object = write_temp(PET);

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(format!("{}/schema.json", server.url()))
            .args(["--type", "Pet", "--fields", "name"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"name":"Garfield"}"#));

        mock.assert();
    }

    #[test]
    fn remote_schema_404_exits_3() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/schema.json").with_status(404).create();
        let object = write_temp(PET);

        cmd()
            .arg("render")
            .arg(object.path())
            .arg("--schema")
            .arg(format!("{}/schema.json", server.url()))
            .args(["--type", "Pet"])
            .assert()
            .failure()
            .code(3)
            .stderr(predicate::str::contains("failed to fetch"));
    }
}
