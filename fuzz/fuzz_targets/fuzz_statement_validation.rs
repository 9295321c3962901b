#![no_main]

use libfuzzer_sys::fuzz_target;
use sigma_zkp::protocol::SigmaRelation;
use sigma_zkp::variants::dlog_equality::DlogEqualityRelation;
use sigma_zkp::{GroupAlgebra, Ristretto255};

fuzz_target!(|data: &[u8]| {
    if data.len() < 128 {
        return;
    }

    let relation = DlogEqualityRelation::new(Ristretto255::new());
    let parts: Vec<Vec<u8>> = data[..128].chunks(32).map(|chunk| chunk.to_vec()).collect();

    if let Ok(statement) = relation.decode_statement(&parts) {
        for part in relation.encode_statement(&statement) {
            let _ = relation.algebra().element_from_bytes(&part);
        }
    }
});
