//! Command-line front end for the navigator store.
//!
//! Opens the database named by `NAVIGATOR_DB_PATH`, runs one command, and
//! prints plain-text results. File logging starts only when
//! `NAVIGATOR_LOG_DIR` is set.

use clap::{Args, Parser, Subcommand};
use log::info;
use navigator_core::db::open_db;
use navigator_core::{
    init_logging, CoreConfig, CrudService, EnrollmentService, Exam, ExamService, NewExam,
    ReconcileOutcome, SqliteEnrollmentStore, SqliteExamRepository, SqliteStudentRepository,
    SqliteSubjectRepository, Student, StudentService, StudentUpdate, SubjectService,
};
use std::error::Error;
use uuid::Uuid;

type CliResult = Result<(), Box<dyn Error>>;

/// Subject, exam and student enrollment manager
#[derive(Parser, Debug)]
#[command(name = "navigator")]
#[command(version, about = "Subject, exam and student enrollment manager")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Health check
    Ping,
    /// Print the core library version
    Version,
    /// Manage subjects
    #[command(subcommand)]
    Subject(SubjectCommand),
    /// Manage exams
    #[command(subcommand)]
    Exam(ExamCommand),
    /// Manage students and their enrollments
    #[command(subcommand)]
    Student(StudentCommand),
}

#[derive(Subcommand, Debug)]
enum SubjectCommand {
    /// Create a subject
    Add { name: String },
    /// List subjects by name
    List,
}

#[derive(Subcommand, Debug)]
enum ExamCommand {
    /// Create the exam for a subject
    Add { subject_id: Uuid, name: String },
    /// List exams by name
    List,
}

#[derive(Subcommand, Debug)]
enum StudentCommand {
    /// Create a student
    Add { name: Option<String> },
    /// List students
    List,
    /// Add subject and exam enrollments
    Enroll(EnrollArgs),
}

#[derive(Args, Debug)]
struct EnrollArgs {
    student_id: Uuid,

    /// Subject id to enroll in (repeatable)
    #[arg(long = "subject")]
    subjects: Vec<Uuid>,

    /// Exam id to enroll in (repeatable)
    #[arg(long = "exam")]
    exams: Vec<Uuid>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> CliResult {
    match command {
        Command::Ping => {
            println!("{}", navigator_core::ping());
            return Ok(());
        }
        Command::Version => {
            println!("navigator_core {}", navigator_core::core_version());
            return Ok(());
        }
        _ => {}
    }

    let config = CoreConfig::from_env();
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }
    let conn = open_db(&config.db_path)?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    match command {
        Command::Subject(SubjectCommand::Add { name }) => {
            let service = SubjectService::new(SqliteSubjectRepository::try_new(&conn)?);
            let subject = service.create(name)?;
            println!("{}\t{}", subject.id, subject.name);
        }
        Command::Subject(SubjectCommand::List) => {
            let service = SubjectService::new(SqliteSubjectRepository::try_new(&conn)?);
            for subject in service.list()? {
                println!("{}\t{}", subject.id, subject.name);
            }
        }
        Command::Exam(ExamCommand::Add { subject_id, name }) => {
            let service = ExamService::new(
                SqliteExamRepository::try_new(&conn)?,
                SqliteSubjectRepository::try_new(&conn)?,
            );
            print_exam(&service.create(NewExam { subject_id, name })?);
        }
        Command::Exam(ExamCommand::List) => {
            let service = ExamService::new(
                SqliteExamRepository::try_new(&conn)?,
                SqliteSubjectRepository::try_new(&conn)?,
            );
            for exam in service.list()? {
                print_exam(&exam);
            }
        }
        Command::Student(StudentCommand::Add { name }) => {
            let service = StudentService::new(SqliteStudentRepository::try_new(&conn)?);
            print_student(&service.create(name)?);
        }
        Command::Student(StudentCommand::List) => {
            let service = StudentService::new(SqliteStudentRepository::try_new(&conn)?);
            for student in service.list()? {
                print_student(&student);
            }
        }
        Command::Student(StudentCommand::Enroll(args)) => {
            let service = EnrollmentService::new(SqliteEnrollmentStore::try_new(&conn)?);
            let update = StudentUpdate {
                name: None,
                enrolled_subjects: Some(args.subjects),
                enrolled_exams: Some(args.exams),
            };
            print_outcome(&service.reconcile_student(args.student_id, &update)?);
        }
        Command::Ping | Command::Version => {}
    }
    Ok(())
}

fn print_exam(exam: &Exam) {
    println!(
        "{}\t{}\tsubject={} ({})",
        exam.id, exam.name, exam.subject.name, exam.subject.id
    );
}

fn print_student(student: &Student) {
    println!(
        "{}\t{}\tsubjects={} exams={}",
        student.id,
        student.name.as_deref().unwrap_or("-"),
        student.subject_ids.len(),
        student.exam_ids.len()
    );
}

fn print_outcome(outcome: &ReconcileOutcome) {
    print_student(&outcome.student);
    for id in &outcome.not_found_subject_ids {
        println!("subject not found: {id}");
    }
    for id in &outcome.not_found_exam_ids {
        println!("exam not found: {id}");
    }
    if let Some(message) = outcome.message() {
        println!("{message}");
    }
}
