use std::collections::HashMap;
use std::process::ExitCode;

use tape_survey::prompts::{Confirm, Editor, Input, MultiSelect, Password, Select};
use tape_survey::{
    ask, max_items, record, required, title, Answer, AskOptions, Question, SurveyError,
};

const COLORS: [&str; 6] = ["red", "orange", "yellow", "green", "blue", "violet"];
const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Default)]
struct Profile {
    name: String,
    color: String,
    days: Vec<String>,
    pizza: bool,
    bio: String,
}

record!(Profile {
    name,
    color,
    days = "favorite_days",
    pizza,
    bio,
});

fn questions() -> Vec<Question> {
    vec![
        Question::new(
            "name",
            Input::new("What is your name?").help("First and last name"),
        )
        .validate(required())
        .transform(title()),
        Question::new(
            "color",
            Select::new("Choose a color:", COLORS)
                .default_value("blue")
                .description(|value, _| match value {
                    "red" | "orange" | "yellow" => "warm".to_string(),
                    _ => "cool".to_string(),
                }),
        ),
        Question::new(
            "favorite_days",
            MultiSelect::new("What days do you prefer:", DAYS).default_values(["Saturday"]),
        )
        .validate(max_items(3)),
        Question::new("pizza", Confirm::new("Is pizza your favorite food?")),
        Question::new(
            "bio",
            Editor::new("Shortly describe yourself")
                .help("Saved text becomes your bio")
                .file_name("bio*.md"),
        ),
    ]
}

fn run() -> Result<(), SurveyError> {
    let mut profile = Profile::default();
    ask(&questions(), &mut profile, AskOptions::new().page_size(5))?;
    println!("{profile:#?}");

    let mut secrets: HashMap<String, Answer> = HashMap::new();
    let login = [Question::new("password", Password::new("Password")).validate(required())];
    ask(&login, &mut secrets, AskOptions::new().hide_character('•'))?;
    let length = secrets
        .get("password")
        .map_or(0, |answer| answer.to_string().chars().count());
    println!("password has {length} characters");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tape_survey=warn")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(SurveyError::Interrupted) => {
            eprintln!("interrupted");
            ExitCode::from(130)
        }
        Err(err) => {
            eprintln!("survey failed: {err}");
            ExitCode::FAILURE
        }
    }
}
