mod config;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use opentdb::{OpenTriviaDb, TriviaError};
use quiz_engine::{summary, AbortReason, QuizResult, QuizSession, SessionEvent, SessionPhase};
use shared::{
    CategoryId, Counts, Difficulty, Question, QuestionType, QuizParameters, TimerMode,
};
use storage::QuizStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "quizzical", about = "Trivia quizzes from the Open Trivia DB")]
struct Cli {
    /// Use this quiz list instead of the configured one.
    #[arg(long)]
    quizzes_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the saved quizzes.
    List,
    Add(QuizArgs),
    Edit {
        number: usize,
        #[command(flatten)]
        quiz: QuizArgs,
    },
    Remove {
        number: usize,
    },
    /// Show the trivia categories the backend offers.
    Categories,
    /// Show question counts, overall or for one category.
    Counts {
        category: Option<i64>,
    },
    /// Take one of the saved quizzes.
    Take {
        number: usize,
    },
}

#[derive(Args, Debug)]
struct QuizArgs {
    title: String,
    #[arg(long, short = 'n', default_value_t = shared::quiz::DEFAULT_NUMBER_OF_QUESTIONS)]
    questions: u32,
    #[arg(long)]
    category: Option<i64>,
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,
    #[arg(long = "type", value_parser = parse_question_type)]
    question_type: Option<QuestionType>,
    #[arg(long, value_parser = parse_timer_mode, default_value = "none")]
    timer: TimerMode,
    #[arg(long, default_value_t = 0)]
    seconds: u32,
}

impl From<QuizArgs> for QuizParameters {
    fn from(args: QuizArgs) -> Self {
        Self {
            title: args.title,
            number_of_questions: args.questions,
            category: args.category.map(CategoryId),
            difficulty: args.difficulty,
            question_type: args.question_type,
            timer_type: args.timer,
            timer_value: args.seconds,
        }
    }
}

fn parse_difficulty(raw: &str) -> Result<Difficulty, String> {
    Difficulty::ALL
        .into_iter()
        .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| format!("unknown difficulty '{raw}' (easy, medium, hard)"))
}

fn parse_question_type(raw: &str) -> Result<QuestionType, String> {
    QuestionType::ALL
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| format!("unknown question type '{raw}' (multiple, boolean)"))
}

fn parse_timer_mode(raw: &str) -> Result<TimerMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "none" => Ok(TimerMode::None),
        "per-question" => Ok(TimerMode::PerQuestion),
        "whole-quiz" => Ok(TimerMode::WholeQuiz),
        _ => Err(format!(
            "unknown timer '{raw}' (none, per-question, whole-quiz)"
        )),
    }
}

/// Quizzes are numbered from 1 on the command line.
fn slot(number: usize) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("quiz numbers start at 1"),
    }
}

fn is_unreachable(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<TriviaError>()
            .is_some_and(TriviaError::is_transport)
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_unreachable(&err) => {
            eprintln!("Unable to connect to the trivia server; remote actions are unavailable.");
            eprintln!("  {err:#}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = load_settings();
    if let Some(path) = cli.quizzes_file {
        settings.quizzes_file = path;
    }

    match cli.command {
        Command::List => {
            let store = QuizStore::load(settings.quizzes_file.clone()).await?;
            if store.is_empty() {
                println!("No quizzes saved in {}", store.path().display());
            }
            for (index, quiz) in store.quizzes().iter().enumerate() {
                println!(
                    "{:>3}. {} ({} questions, {})",
                    index + 1,
                    quiz.title,
                    quiz.number_of_questions,
                    quiz.timer_type.description()
                );
            }
        }
        Command::Add(quiz) => {
            let mut store = QuizStore::load(settings.quizzes_file.clone()).await?;
            let index = store.add(quiz.into()).await?;
            println!("saved quiz {}", index + 1);
        }
        Command::Edit { number, quiz } => {
            let mut store = QuizStore::load(settings.quizzes_file.clone()).await?;
            store.modify(slot(number)?, quiz.into()).await?;
            println!("updated quiz {number}");
        }
        Command::Remove { number } => {
            let mut store = QuizStore::load(settings.quizzes_file.clone()).await?;
            let removed = store.remove(slot(number)?).await?;
            println!("removed '{}'", removed.title);
        }
        Command::Categories => {
            let client = trivia_client(&settings)?;
            for category in client.categories().await? {
                println!("{:>4}  {}", category.id(), category.name());
            }
        }
        Command::Counts { category: None } => {
            let client = trivia_client(&settings)?;
            print_counts("All categories", client.overall_counts().await?);
        }
        Command::Counts {
            category: Some(id),
        } => {
            let client = trivia_client(&settings)?;
            let id = CategoryId(id);
            let category = client.category(id).await?;
            print_counts(category.name(), client.counts_for(id).await?);
        }
        Command::Take { number } => {
            let store = QuizStore::load(settings.quizzes_file.clone()).await?;
            let params = store
                .get(slot(number)?)
                .cloned()
                .with_context(|| format!("there is no quiz {number}"))?;
            take(&settings, params).await?;
        }
    }

    Ok(())
}

fn trivia_client(settings: &Settings) -> Result<OpenTriviaDb> {
    Ok(OpenTriviaDb::with_config(settings.client_config()?)?)
}

fn print_counts(label: &str, counts: Counts) {
    println!("{label}");
    println!("  questions: {}", counts.questions);
    println!("  pending:   {}", counts.pending);
    println!("  verified:  {}", counts.verified);
    println!("  rejected:  {}", counts.rejected);
}

enum Prompt {
    Idle,
    Loading,
    Confirm,
    Answer { index: usize, question: Question },
}

#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Cancel,
    Confirm,
    Answer { index: usize, answer: String },
    Invalid { choices: usize },
    Ignored,
}

/// What a line typed at `prompt` asks the session to do. `q` cancels from
/// any prompt, including while questions are still loading.
fn interpret(prompt: &Prompt, line: &str) -> Reply {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Reply::Cancel;
    }
    match prompt {
        Prompt::Idle | Prompt::Loading => Reply::Ignored,
        Prompt::Confirm => Reply::Confirm,
        Prompt::Answer { index, question } => line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| question.answers().get(n))
            .map_or(
                Reply::Invalid {
                    choices: question.answers().len(),
                },
                |answer| Reply::Answer {
                    index: *index,
                    answer: answer.clone(),
                },
            ),
    }
}

async fn take(settings: &Settings, params: QuizParameters) -> Result<()> {
    let client = Arc::new(trivia_client(settings)?);
    let category_name = match params.category {
        Some(id) => match client.category(id).await {
            Ok(category) => Some(category.name().to_string()),
            Err(err) => {
                warn!(%err, "could not resolve quiz category");
                None
            }
        },
        None => None,
    };

    let (handle, mut events) = QuizSession::start(client, params.clone());
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut prompt = Prompt::Idle;

    loop {
        tokio::select! {
            event = events.next() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    SessionEvent::StateChanged(SessionPhase::Loading) => {
                        println!("Loading \"{}\"... (q to cancel)", params.title);
                        prompt = Prompt::Loading;
                    }
                    SessionEvent::StateChanged(SessionPhase::Confirming { question_count }) => {
                        println!();
                        println!("{}", params.title);
                        let name = category_name.as_deref();
                        println!("{}", summary::describe(&params, question_count, name));
                        println!();
                        println!("Press Enter to start, or q to cancel.");
                        prompt = Prompt::Confirm;
                    }
                    SessionEvent::StateChanged(_) => {}
                    SessionEvent::QuestionPresented { index, total, question } => {
                        println!();
                        println!("Question {} of {}: {}", index + 1, total, question.text());
                        for (n, answer) in question.answers().iter().enumerate() {
                            println!("  {}. {answer}", n + 1);
                        }
                        prompt = Prompt::Answer { index, question };
                    }
                    SessionEvent::ScoreChanged { correct, incorrect } => {
                        println!("[{correct} right, {incorrect} wrong]");
                    }
                    SessionEvent::TimerTick { remaining } => {
                        if remaining <= 5 || remaining % 10 == 0 {
                            println!("({remaining}s left)");
                        }
                    }
                    SessionEvent::Finished(result) => {
                        print_result(&result);
                    }
                    SessionEvent::Aborted(AbortReason::Cancelled) => {
                        println!("Quiz cancelled.");
                    }
                    SessionEvent::Aborted(AbortReason::Fetch(err)) => {
                        return Err(err).context("could not load the quiz");
                    }
                    SessionEvent::Aborted(reason @ AbortReason::NoQuestions) => {
                        bail!("{reason}");
                    }
                }
            }
            line = input.next_line(), if !matches!(prompt, Prompt::Idle) => {
                let Some(line) = line? else {
                    handle.cancel();
                    prompt = Prompt::Idle;
                    continue;
                };
                match interpret(&prompt, &line) {
                    Reply::Cancel => {
                        handle.cancel();
                        prompt = Prompt::Idle;
                    }
                    Reply::Confirm => {
                        handle.confirm();
                        prompt = Prompt::Idle;
                    }
                    Reply::Answer { index, answer } => {
                        handle.submit_answer(index, answer);
                        prompt = Prompt::Idle;
                    }
                    Reply::Invalid { choices } => println!("Pick 1 to {choices}."),
                    Reply::Ignored => {}
                }
            }
        }
    }

    handle.close();
    Ok(())
}

fn print_result(result: &QuizResult) {
    println!();
    println!("{}", result.score_line());
    for (n, entry) in result.transcript.iter().enumerate() {
        let verdict = if entry.correct { "right" } else { "wrong" };
        let given = entry.answer.as_deref().unwrap_or("(no answer)");
        println!("{:>3}. {} [{verdict}]", n + 1, entry.question.text());
        println!("     you said: {given}");
        if !entry.correct {
            println!("     answer:   {}", entry.question.correct_answer());
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
