use clap::Parser;
use offering_generator::model::columns;
use offering_generator::{CliArgs, GeneratorConfig, NamingConvention, run_generator};

mod support;

use support::{PARENT_LAB, TemplateSheet, TestWorkspace};

#[test]
fn yaml_config_drives_a_full_run() {
    let workspace = TestWorkspace::new();
    workspace.write_template(
        "PL",
        &TemplateSheet::standard().offering(
            "SO0001",
            PARENT_LAB,
            "[IM HS PL Lab] Laboratory software incidents",
        ),
    );
    let config_path = workspace.input_dir().join("run.yaml");
    std::fs::write(
        &config_path,
        format!(
            "input_dir: {input:?}\noutput_dir: {output:?}\nkeywords: [Lab]\napps: [SDMS]\n\
             days: [Mon-Sun]\nhours: [0-24]\nrsp: 1h\nrsl: 8h\nsr_or_im: IM\n\
             support_group: SG-LAB / MBG-LAB\naliases_on: true\naliases: [LIS]\n",
            input = workspace.input_dir().to_string_lossy(),
            output = workspace.output_dir().to_string_lossy(),
        ),
    )
    .unwrap();

    let args = CliArgs::parse_from([
        "offering-generator",
        "--config",
        config_path.to_str().unwrap(),
        "--naming-convention",
        "child_lvl1_hardware",
    ]);
    let config = GeneratorConfig::from_args(args).expect("config");
    assert_eq!(config.rules.naming, NamingConvention::ChildLvl1Hardware);
    config.validate().expect("valid config");

    let path = run_generator(&config).expect("generate");
    let book = support::read_output(&path);
    let sheet = book.get_sheet_by_name("PL").unwrap();

    assert_eq!(
        support::column_values(sheet, columns::NAME),
        vec!["[IM HS PL Lab] Laboratory software solving Mon-Sun 0-24"]
    );
    assert_eq!(
        support::column_values(sheet, columns::SUPPORT_GROUP),
        vec!["SG-LAB"]
    );
    assert_eq!(
        support::column_values(sheet, columns::MANAGED_BY_GROUP),
        vec!["MBG-LAB"]
    );
    assert_eq!(support::column_values(sheet, "Aliases"), vec!["LIS"]);
}
