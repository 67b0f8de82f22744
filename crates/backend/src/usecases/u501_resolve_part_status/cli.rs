use super::digikey_api_client::DigiKeyApiClient;
use super::executor::ResolveExecutor;
use super::progress_tracker::{ConsoleReporter, ProgressTracker};
use crate::shared::config::{self, Config};
use contracts::enums::{OutputField, OutputFieldSet};
use contracts::usecases::u501_resolve_part_status::{ProductRecord, ResolveRequest, ResolveStatus};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Параметры `resolve`; незаданные значения запрашиваются интерактивно
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResolveArgs {
    /// Путь к Excel файлу
    #[arg(long)]
    pub file: Option<String>,
    /// Имя листа
    #[arg(long)]
    pub sheet: Option<String>,
    /// Заголовок столбца с номерами деталей
    #[arg(long)]
    pub column: Option<String>,
    /// Заголовок столбца результата
    #[arg(long)]
    pub output: Option<String>,
    /// Дополнительные поля через запятую, например `manufacturer,quantity_available`
    #[arg(long, value_delimiter = ',', value_parser = parse_field)]
    pub fields: Vec<OutputField>,
}

/// Код поля из командной строки
pub fn parse_field(code: &str) -> Result<OutputField, String> {
    OutputField::from_code(code.trim()).ok_or_else(|| {
        let known: Vec<&str> = OutputField::all().iter().map(|f| f.code()).collect();
        format!("未知字段 '{}' (可用: {})", code, known.join(", "))
    })
}

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

fn prompt(input: &mut impl BufRead, label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Значение из аргумента или повторный запрос, пока не будет введено непустое
fn prefilled_or_prompt(
    input: &mut impl BufRead,
    prefilled: Option<String>,
    label: &str,
) -> anyhow::Result<String> {
    if let Some(value) = prefilled.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        return Ok(value);
    }
    loop {
        match prompt(input, label)? {
            Some(value) if !value.is_empty() => return Ok(value),
            Some(_) => continue,
            None => anyhow::bail!("输入已结束"),
        }
    }
}

/// Собрать запрос из аргументов и ответов пользователя.
///
/// Пустой ответ на заголовок результата означает имя по умолчанию.
pub fn collect_request(input: &mut impl BufRead, args: ResolveArgs) -> anyhow::Result<ResolveRequest> {
    let file = prefilled_or_prompt(input, args.file, "请输入Excel文件路径: ")?;
    let sheet = prefilled_or_prompt(input, args.sheet, "请输入工作表名称: ")?;
    let column = prefilled_or_prompt(input, args.column, "请输入产品编号列的表头名称: ")?;

    let output = match args.output {
        Some(output) => Some(output),
        None => prompt(input, "请输入结果列的表头名称 (回车使用默认值): ")?,
    };

    let mut request = ResolveRequest::new(file, sheet, column);
    request.result_column_name = output.filter(|o| !o.trim().is_empty());
    request.selected_fields = args
        .fields
        .into_iter()
        .collect::<OutputFieldSet>()
        .with(OutputField::Status);
    Ok(request)
}

fn build_executor(config: &Config) -> anyhow::Result<ResolveExecutor> {
    let client = DigiKeyApiClient::new(&config.digikey)?;
    Ok(ResolveExecutor::new(
        Arc::new(client),
        Arc::new(ProgressTracker::new()),
        config::get_snapshot_path(config),
        config::get_upload_dir(config),
    ))
}

/// Интерактивная обработка файла. Возвращает false при ошибке прогона.
pub async fn run_resolve(config: &Config, args: ResolveArgs) -> anyhow::Result<bool> {
    let request = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        collect_request(&mut input, args)?
    };
    let executor = build_executor(config)?;
    let workbook_path = PathBuf::from(&request.filename);

    println!("\n开始处理...");
    match executor.run(&request, &workbook_path, &ConsoleReporter).await {
        Ok(outcome) => {
            println!("\n处理状态: {}", outcome.status.display_name());
            println!("消息: {}", outcome.message);
            println!(
                "详细数据已保存到: {}",
                executor.snapshot_path_for(&workbook_path).display()
            );
            Ok(true)
        }
        Err(e) => {
            tracing::error!("CLI resolve failed: {}", e);
            println!("\n处理状态: {}", ResolveStatus::Failed.display_name());
            println!("消息: {}", e);
            Ok(false)
        }
    }
}

/// Строки для печати одной записи
pub fn record_lines(record: &ProductRecord) -> Vec<String> {
    OutputField::all()
        .into_iter()
        .map(|field| {
            let value = match field {
                OutputField::Status => record.status.clone(),
                OutputField::Description => record.description.clone(),
                OutputField::Manufacturer => record.manufacturer.clone(),
                OutputField::ProductUrl => record.product_url.clone(),
                OutputField::DatasheetUrl => record.datasheet_url.clone(),
                OutputField::QuantityAvailable => record.quantity_available.to_string(),
            };
            format!("{}: {}", field.default_label(), value)
        })
        .collect()
}

fn is_exit_word(input: &str) -> bool {
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

/// Цикл запросов по одной детали
pub async fn run_lookup(config: &Config) -> anyhow::Result<()> {
    let client = DigiKeyApiClient::new(&config.digikey)?;
    let stdin = io::stdin();

    println!("DigiKey 产品状态查询 (输入 exit 退出)");
    loop {
        let line = {
            let mut input = stdin.lock();
            prompt(&mut input, "\n请输入产品编号或DigiKey产品链接: ")?
        };
        let Some(line) = line else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        if is_exit_word(&line) {
            break;
        }

        match client.get_product_info(&line).await {
            Ok(record) => {
                for text in record_lines(&record) {
                    println!("  {}", text);
                }
            }
            Err(e) => println!("查询失败: {}", e),
        }
    }

    println!("再见!");
    Ok(())
}
