use reel_domain::{AssetPayload, AssetRecord, FilterExpr, Segment, asset_id};
use reel_storage::{models::VectorQuery, qdrant::QdrantStore};
use reel_testkit::TestCollection;

fn unit(dim: usize, axis: usize) -> Vec<f32> {
	let mut vector = vec![0.0; dim];

	vector[axis] = 1.0;

	vector
}

fn record(path: &str, vector: Vec<f32>, tags: &[&str], description: &str) -> AssetRecord {
	AssetRecord {
		id: None,
		vector,
		payload: AssetPayload {
			file_path: path.to_string(),
			tags: tags.iter().map(|tag| tag.to_string()).collect(),
			description: description.to_string(),
			duration: 4.0,
			segment: Some(Segment { start: 0.0, end: 4.0, index: 0 }),
			..AssetPayload::default()
		},
	}
}

#[tokio::test]
#[ignore = "Requires external Qdrant. Set REEL_QDRANT_URL to run."]
async fn upsert_then_query_round_trips_payload_and_vector() {
	let Some(qdrant_url) = reel_testkit::env_qdrant_url() else {
		eprintln!("Skipping; set REEL_QDRANT_URL to run this test.");

		return;
	};
	let collection = TestCollection::new(&qdrant_url, "reel_storage");
	let cfg = reel_config::Qdrant {
		url: qdrant_url.clone(),
		collection: collection.name().to_string(),
		vector_dim: 4,
	};
	let store = QdrantStore::new(&cfg).expect("Failed to build Qdrant client.");

	store.ensure_collection().await.expect("Failed to create collection.");
	store
		.upsert_assets(&[
			record("/clips/street.mp4", unit(4, 0), &["street"], "a rainy street"),
			record("/clips/office.mp4", unit(4, 1), &["office"], "an open office"),
		])
		.await
		.expect("Failed to upsert assets.");

	let hits = store
		.query_assets(&VectorQuery {
			vector: unit(4, 0),
			limit: 5,
			score_threshold: None,
			filter: FilterExpr::from_parts(Some(vec!["street".to_string()]), None),
		})
		.await
		.expect("Failed to query assets.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].id, asset_id("/clips/street.mp4", 0));
	assert_eq!(hits[0].payload.tags, vec!["street".to_string()]);
	assert_eq!(hits[0].vector.len(), 4);
	assert!((hits[0].score - 1.0).abs() < 1e-4);

	collection.cleanup().await.expect("Failed to clean up collection.");
}
