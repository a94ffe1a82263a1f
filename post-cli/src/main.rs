mod logging;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use post_client::{
    ClientError, ClientResult, Credentials, FileCredentialStore, HttpTransport, NotificationQueue,
    PageResult, Post, PostClient, PostDraft, PostQuery, Registration, Role, Severity,
    SortDirection, User, access,
};
use serde_json::json;
use tracing::debug;

use crate::logging::init_logging;
use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "post-cli", version, about = "CLI клиент для REST API блога")]
struct Cli {
    /// Базовый URL API, например `http://localhost:8080/api`.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать данные в JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Регистрация пользователя (сессию не создаёт).
    Register(RegisterArgs),
    /// Выход: удаляет сохранённый токен.
    Logout,
    /// Состояние сессии.
    Status {
        /// Запросить профиль у сервера.
        #[arg(long)]
        remote: bool,
    },
    /// Работа с постами.
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Управление пользователями (для администратора).
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Debug, Args)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Подтверждение пароля; по умолчанию совпадает с `--password`.
    #[arg(long)]
    confirm_password: Option<String>,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// `M` или `F`.
    #[arg(long)]
    gender: String,
}

#[derive(Debug, Subcommand)]
enum PostsCommand {
    /// Страница постов.
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        /// Поле сортировки, например `createdAt` или `title`.
        #[arg(long)]
        sort_by: Option<String>,
        /// `asc` или `desc`.
        #[arg(long)]
        direction: Option<SortDirection>,
        /// Только мои посты.
        #[arg(long)]
        mine: bool,
    },
    /// Пост по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Обновление поста.
    ///
    /// Если `--content` не указан, используется текущее содержимое поста.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: Option<String>,
    },
    /// Удаление поста.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    /// Все пользователи.
    List,
    /// Удаление пользователя.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Смена роли пользователя.
    SetRole {
        #[arg(long)]
        id: i64,
        /// `USER` или `ADMIN`.
        #[arg(long)]
        role: Role,
    },
}

type Client = PostClient<HttpTransport>;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Ошибка: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env()
        .context("failed to load settings")?
        .with_server(cli.server);
    init_logging(&settings.log_level)?;
    debug!(api_url = %settings.api_url, token_file = %settings.token_file.display(), "settings loaded");

    let store = Arc::new(FileCredentialStore::new(&settings.token_file));
    let transport = HttpTransport::new(settings.transport_config(), store.clone())
        .context("failed to build HTTP client")?
        .with_unauthorized_hook(|| {
            eprintln!("Сессия недействительна: выполните `post-cli login --username ... --password ...`");
        });
    let mut client = PostClient::new(transport, store);
    client.check_auth_status();

    let mut notices = NotificationQueue::new();
    let output = Output { json: cli.json };
    let outcome = execute(cli.command, &mut client, &mut notices, &output).await;

    let code = match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(ClientError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            notices.enqueue("Проверьте правильность заполнения полей", Severity::Error);
            ExitCode::FAILURE
        }
        Err(err) => {
            debug!(error = %err, "command failed");
            notices.enqueue(err.user_message(), Severity::Error);
            ExitCode::FAILURE
        }
    };

    print_notices(&notices);
    Ok(code)
}

async fn execute(
    command: Command,
    client: &mut Client,
    notices: &mut NotificationQueue,
    output: &Output,
) -> ClientResult<()> {
    match command {
        Command::Login { username, password } => {
            client.login(&Credentials { username, password }).await?;
            if let Some(user) = client.session().user.as_ref() {
                output.user("Вход выполнен", user);
            }
            notices.enqueue("Вход выполнен", Severity::Success);
        }
        Command::Register(args) => {
            let confirm = args.confirm_password.unwrap_or_else(|| args.password.clone());
            let registration = Registration {
                username: args.username,
                password: args.password,
                first_name: args.first_name,
                last_name: args.last_name,
                gender: args.gender,
                email: args.email,
            };
            let user = client.register(&registration, &confirm).await?;
            output.user("Пользователь зарегистрирован", &user);
            notices.enqueue(
                "Регистрация успешна, теперь выполните вход",
                Severity::Success,
            );
        }
        Command::Logout => {
            client.logout();
            notices.enqueue("Вы вышли из системы", Severity::Info);
        }
        Command::Status { remote } => {
            if !client.session().is_authenticated() {
                println!("Не авторизован");
                return Ok(());
            }
            if !remote {
                println!("Токен сохранён (сервер не проверялся)");
                return Ok(());
            }
            let user = client.refresh_current_user().await?;
            output.user("Авторизован", &user);
        }
        Command::Posts(command) => execute_posts(command, client, notices, output).await?,
        Command::Users(command) => execute_users(command, client, notices, output).await?,
    }
    Ok(())
}

async fn execute_posts(
    command: PostsCommand,
    client: &mut Client,
    notices: &mut NotificationQueue,
    output: &Output,
) -> ClientResult<()> {
    match command {
        PostsCommand::List {
            page,
            size,
            sort_by,
            direction,
            mine,
        } => {
            let query = PostQuery {
                page: Some(page),
                size,
                sort_by,
                direction,
                my_posts: mine,
            };
            let page = client.fetch_posts(query).await?;
            output.page(page);
        }
        PostsCommand::Get { id } => match client.fetch_post(id).await? {
            Some(post) => output.post("Пост", post),
            None => {
                notices.enqueue(format!("Пост {id} не найден"), Severity::Warning);
            }
        },
        PostsCommand::Create { title, content } => {
            let post = client.create_post(&PostDraft { title, content }).await?;
            output.post("Пост создан", &post);
            notices.enqueue("Пост создан", Severity::Success);
        }
        PostsCommand::Update { id, title, content } => {
            let content = match content {
                Some(content) => content,
                None => existing_content(client, id).await?,
            };
            let post = client.update_post(id, &PostDraft { title, content }).await?;
            output.post("Пост обновлён", &post);
            notices.enqueue("Пост обновлён", Severity::Success);
        }
        PostsCommand::Delete { id } => {
            client.delete_post(id).await?;
            notices.enqueue(format!("Пост удалён: id={id}"), Severity::Success);
        }
    }
    Ok(())
}

async fn existing_content(client: &mut Client, id: i64) -> ClientResult<String> {
    match client.fetch_post(id).await? {
        Some(post) => Ok(post.content.clone()),
        None => Err(ClientError::from_status(
            404,
            None,
            Some(format!("Пост {id} не найден")),
        )),
    }
}

async fn execute_users(
    command: UsersCommand,
    client: &mut Client,
    notices: &mut NotificationQueue,
    output: &Output,
) -> ClientResult<()> {
    match command {
        UsersCommand::List => {
            let users = client.fetch_users().await?;
            output.users(users);
        }
        UsersCommand::Delete { id } => {
            ensure_can_modify(client, id).await?;
            client.delete_user(id).await?;
            notices.enqueue(format!("Пользователь удалён: id={id}"), Severity::Success);
        }
        UsersCommand::SetRole { id, role } => {
            ensure_can_modify(client, id).await?;
            client.update_user_role(id, role).await?;
            notices.enqueue(
                format!("Роль пользователя {id} изменена на {role}"),
                Severity::Success,
            );
        }
    }
    Ok(())
}

/// Администратор не может удалить себя или сменить себе роль.
async fn ensure_can_modify(client: &mut Client, target_id: i64) -> ClientResult<()> {
    if client.session().is_authenticated() && client.session().user.is_none() {
        client.refresh_current_user().await?;
    }
    if access::can_modify_user(client.session(), target_id) {
        return Ok(());
    }
    let message = if client.session().subject_id() == Some(target_id) {
        "Нельзя изменить собственную учётную запись"
    } else {
        "Недостаточно прав"
    };
    Err(ClientError::from_status(403, None, Some(message.to_string())))
}

fn print_notices(notices: &NotificationQueue) {
    for notice in notices.entries() {
        match notice.severity {
            Severity::Error | Severity::Warning => {
                eprintln!("[{}] {}", notice.severity.label(), notice.message)
            }
            Severity::Success | Severity::Info => {
                println!("[{}] {}", notice.severity.label(), notice.message)
            }
        }
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn user(&self, title: &str, user: &User) {
        if self.json {
            println!("{}", json!(user));
            return;
        }
        println!("{title}");
        println!("  id: {}", user.id);
        println!("  username: {}", user.username);
        println!("  email: {}", user.email);
        println!("  name: {}", user.full_name());
        println!("  role: {}", user.role);
    }

    fn post(&self, title: &str, post: &Post) {
        if self.json {
            println!("{}", json!(post));
            return;
        }
        println!("{title}");
        println!("id: {}", post.id);
        println!("title: {}", post.title);
        println!("content: {}", post.content);
        println!("author: {}", post.author.username);
        println!("created_at: {}", post.created_at);
        println!("updated_at: {}", post.updated_at);
    }

    fn page(&self, page: &PageResult<Post>) {
        if self.json {
            println!(
                "{}",
                json!({
                    "posts": page.items,
                    "page": page.page_index,
                    "size": page.page_size,
                    "totalPages": page.total_pages,
                    "totalElements": page.total_items,
                })
            );
            return;
        }
        println!("{}", page_summary(page));
        for post in &page.items {
            println!("- [{}] {} (author={})", post.id, post.title, post.author.username);
        }
    }

    fn users(&self, users: &[User]) {
        if self.json {
            println!("{}", json!(users));
            return;
        }
        println!("Пользователей: {}", users.len());
        for user in users {
            println!(
                "- [{}] {} <{}> {}",
                user.id, user.username, user.email, user.role
            );
        }
    }
}

fn page_summary(page: &PageResult<Post>) -> String {
    if page.is_empty() {
        return "Постов не найдено".to_string();
    }
    format!(
        "Постов: {} (страница {} из {}, всего {})",
        page.items.len(),
        page.page_index + 1,
        page.total_pages,
        page.total_items
    )
}
