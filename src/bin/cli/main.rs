use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{
    multipart::{Form, Part},
    Body, Client, Response, StatusCode,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;

#[derive(Parser, Debug)]
#[command(name = "catalog-cli")]
#[command(about = "CLI for interacting with the catalog server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "CATALOG_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List products
    List {
        /// Show names upper-cased
        #[arg(long)]
        uppercase: bool,
    },

    /// Show one product
    Get {
        /// Product id
        id: String,
    },

    /// Create a product, optionally with a picture
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        /// Category name
        #[arg(long)]
        category: String,
        /// Category id
        #[arg(long)]
        category_id: Option<String>,
        /// Picture file to attach
        #[arg(long)]
        picture: Option<PathBuf>,
    },

    /// Upload a picture for an existing product
    Upload {
        /// Product id
        id: String,
        /// Picture file path
        file: PathBuf,
    },

    /// Delete a product
    Delete {
        /// Product id
        id: String,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommands {
    /// List categories
    List,

    /// Create a category
    Create {
        /// Category name
        name: String,
    },

    /// Delete a category
    Delete {
        /// Category id
        id: String,
    },
}

struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn run(&self, command: Commands) -> Result<Value> {
        match command {
            Commands::List { uppercase } => {
                let request = self
                    .http
                    .get(self.url("/api/products"))
                    .query(&[("uppercase", uppercase)]);
                read_json(request.send().await?).await
            }
            Commands::Get { id } => {
                let response = self
                    .http
                    .get(self.url(&format!("/api/products/{}", id)))
                    .send()
                    .await?;
                read_json(response).await
            }
            Commands::Create {
                name,
                price,
                category,
                category_id,
                picture,
            } => match picture {
                None => {
                    let body = json!({
                        "name": name,
                        "price": price,
                        "category": { "id": category_id, "name": category },
                    });
                    let response = self
                        .http
                        .post(self.url("/api/products"))
                        .json(&body)
                        .send()
                        .await?;
                    read_json(response).await
                }
                Some(path) => {
                    let mut form = Form::new()
                        .text("name", name)
                        .text("price", price.to_string())
                        .text("category.name", category);
                    if let Some(category_id) = category_id {
                        form = form.text("category.id", category_id);
                    }
                    let form = form.part("file", file_part(&path).await?);

                    let response = self
                        .http
                        .post(self.url("/api/products/v2"))
                        .multipart(form)
                        .send()
                        .await?;
                    read_json(response).await
                }
            },
            Commands::Upload { id, file } => {
                let form = Form::new().part("file", file_part(&file).await?);
                let response = self
                    .http
                    .post(self.url(&format!("/api/products/upload/{}", id)))
                    .multipart(form)
                    .send()
                    .await?;
                read_json(response).await
            }
            Commands::Delete { id } => {
                let response = self
                    .http
                    .delete(self.url(&format!("/api/products/{}", id)))
                    .send()
                    .await?;
                read_json(response).await
            }
            Commands::Categories { command } => self.run_category(command).await,
        }
    }

    async fn run_category(&self, command: CategoryCommands) -> Result<Value> {
        let response = match command {
            CategoryCommands::List => self.http.get(self.url("/api/categories")).send().await?,
            CategoryCommands::Create { name } => {
                self.http
                    .post(self.url("/api/categories"))
                    .json(&json!({ "name": name }))
                    .send()
                    .await?
            }
            CategoryCommands::Delete { id } => {
                self.http
                    .delete(self.url(&format!("/api/categories/{}", id)))
                    .send()
                    .await?
            }
        };
        read_json(response).await
    }
}

/// Stream a local file as a multipart file part
async fn file_part(path: &Path) -> Result<Part> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("Picture path has no file name")?;

    Ok(Part::stream(Body::wrap_stream(ReaderStream::new(file))).file_name(file_name))
}

/// Turn a response into JSON, failing on error statuses
async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if status == StatusCode::NOT_FOUND {
        anyhow::bail!("Not found");
    }
    if !status.is_success() {
        anyhow::bail!("Server answered {}: {}", status, text);
    }
    if text.is_empty() {
        return Ok(json!({ "status": status.as_u16() }));
    }

    serde_json::from_str(&text).context("Server answered with invalid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let client = CatalogClient::new(&cli.url);
    let output = client.run(cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
