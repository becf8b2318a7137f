mod error;

pub use error::{Error, Result};

use std::{env, thread, time::Duration};

use qdrant_client::Qdrant;
use tokio::{runtime::Builder, time};
use uuid::Uuid;

const QDRANT_TIMEOUT: Duration = Duration::from_secs(10);

/// A uniquely named Qdrant collection that is dropped when the test finishes.
pub struct TestCollection {
	name: String,
	qdrant_url: String,
	cleaned: bool,
}
impl TestCollection {
	/// Reserves a fresh collection name. The collection itself is created by the code under test.
	pub fn new(qdrant_url: &str, prefix: &str) -> Self {
		let name = format!("{prefix}_{}", Uuid::new_v4().simple());

		Self { name, qdrant_url: qdrant_url.to_string(), cleaned: false }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn qdrant_url(&self) -> &str {
		&self.qdrant_url
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner().await
	}

	async fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		delete_collection(&self.qdrant_url, &self.name).await?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestCollection {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let name = self.name.clone();
		let qdrant_url = self.qdrant_url.clone();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test collection cleanup failed: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(delete_collection(&qdrant_url, &name)) {
				eprintln!("Test Qdrant cleanup failed: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("REEL_QDRANT_URL").ok().filter(|url| !url.trim().is_empty())
}

async fn delete_collection(qdrant_url: &str, name: &str) -> Result<()> {
	let client = Qdrant::from_url(qdrant_url)
		.build()
		.map_err(|err| Error::Message(format!("Failed to build Qdrant client: {err}.")))?;
	let exists = time::timeout(QDRANT_TIMEOUT, client.collection_exists(name.to_string()))
		.await
		.map_err(|_| Error::Message("Qdrant collection_exists timed out.".to_string()))??;

	if !exists {
		return Ok(());
	}

	time::timeout(QDRANT_TIMEOUT, client.delete_collection(name.to_string()))
		.await
		.map_err(|_| {
			Error::Message(format!("Timed out deleting Qdrant collection {name:?}."))
		})??;

	Ok(())
}
