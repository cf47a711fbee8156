//! Wallet synchronization, actions and broadcast

use lugh_wallet::constitution::{Constitution, Rule};
use lugh_wallet::*;

const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const OLD_CCH: Hash = [0x01; 32];
const NEW_CCH: Hash = [0x02; 32];
const TARGET: Pkh = [0x77; 20];

fn config() -> WalletConfig {
    WalletConfig {
        kdf: KdfParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        ..WalletConfig::default()
    }
}

/// Unlocked wallet holding one fresh and one once-melted UTXO
async fn setup() -> (MemoryBackend, Wallet) {
    let backend = MemoryBackend::new();
    let mut wallet = Wallet::new();
    wallet.set(MNEMONIC, "pw", &config()).unwrap();
    wallet.unlock("pw").unwrap();
    let pkh = wallet.pkh().unwrap();

    for (salt, (value, cch)) in [(22_000u64, OLD_CCH), (10_000, NEW_CCH)].into_iter().enumerate() {
        let tx = Transaction::new(
            1,
            salt as i64,
            vec![Input {
                prev_transaction_hash: None,
                vout: 0,
                script_sig: Script::new(),
            }],
            vec![Output {
                value,
                pkh,
                input_src: vec![0],
                ta: Script::new(),
                k: ScriptKind::Empty,
            }],
        );
        let hash = backend.add_transaction(tx);
        backend.add_utxo(hash, 0, MR_SCALE, cch).unwrap();
    }
    backend.set_cch_list(vec![NEW_CCH, OLD_CCH]);
    backend.set_wallet_info(
        pkh,
        WalletInfo {
            content_nonce: 4,
            balance: 31_000,
            fee_per_byte: 1,
            lugh_height: 7,
        },
    );
    wallet.synchronize(&backend).await.unwrap();
    (backend, wallet)
}

#[tokio::test]
async fn test_synchronize_and_balance() {
    let (_backend, wallet) = setup().await;
    assert_eq!(wallet.utxos().len(), 2);
    assert_eq!(wallet.cch_list(), &[NEW_CCH, OLD_CCH]);
    assert_eq!(wallet.info().lugh_height, 7);
    // 22_000 * 21/22 + 10_000
    assert_eq!(wallet.balance(), 31_000);
    assert_eq!(wallet.state().content_nonce, 4);
}

#[tokio::test]
async fn test_locked_wallet_still_synchronizes() {
    let (backend, mut wallet) = setup().await;
    wallet.lock();
    wallet.synchronize(&backend).await.unwrap();
    assert_eq!(wallet.balance(), 31_000);
}

#[tokio::test]
async fn test_broadcast_drops_spent_utxos() {
    let (backend, mut wallet) = setup().await;
    let built = wallet.send(&backend, &config(), TARGET, 15_000).await.unwrap();
    let spent = built.transaction.inputs.len();

    backend.fail_on(BackendStep::Broadcast);
    assert!(matches!(
        wallet.broadcast(&backend, &built.transaction).await,
        Err(WalletError::Backend {
            step: BackendStep::Broadcast,
            ..
        })
    ));
    assert_eq!(wallet.utxos().len(), 2);

    backend.recover(BackendStep::Broadcast);
    let hash = wallet.broadcast(&backend, &built.transaction).await.unwrap();
    assert_eq!(hash, built.transaction.hash());
    assert_eq!(wallet.utxos().len(), 2 - spent);
    assert_eq!(backend.broadcasts(), vec![built.transaction]);
}

#[tokio::test]
async fn test_threads_use_fresh_content_keys() {
    let (backend, mut wallet) = setup().await;

    let first = wallet.create_thread(&backend, &config(), 100).await.unwrap();
    let second = wallet.create_thread(&backend, &config(), 100).await.unwrap();

    let a = &first.transaction.outputs[0];
    let b = &second.transaction.outputs[0];
    assert_eq!(a.k, ScriptKind::Thread);
    assert!(a.ta.is().thread());
    assert_eq!(a.ta.parse().content_nonce().unwrap(), 5);
    assert_eq!(b.ta.parse().content_nonce().unwrap(), 6);
    assert_eq!(a.ta.parse().content_pkh().unwrap(), wallet.keys().content_pkh(5).unwrap());
    assert_eq!(a.pkh, a.ta.parse().content_pkh().unwrap());
    assert_ne!(a.pkh, b.pkh);
}

#[tokio::test]
async fn test_rethread_targets_thread() {
    let (backend, mut wallet) = setup().await;
    let built = wallet.create_rethread(&backend, &config(), TARGET, 50).await.unwrap();
    let script = &built.transaction.outputs[0].ta;
    assert!(script.is().rethread());
    assert_eq!(script.parse().target_pkh().unwrap(), TARGET);
}

#[tokio::test]
async fn test_proposals() {
    let (backend, mut wallet) = setup().await;

    let application = wallet.propose_application(&backend, &config(), 10).await.unwrap();
    assert!(application.transaction.outputs[0].ta.is().application_proposal());

    let costs = ProposalCosts {
        thread: UNCHANGED_COST,
        proposal: 2_500,
    };
    let built = wallet.propose_costs(&backend, &config(), costs, 10).await.unwrap();
    let output = &built.transaction.outputs[0];
    assert_eq!(output.k, ScriptKind::Proposal);
    assert_eq!(output.ta.parse().proposal_costs().unwrap(), costs);

    let constitution = Constitution::new(
        (0..CONSTITUTION_RULE_COUNT)
            .map(|i| Rule {
                title: format!("Rule {}", i),
                content: String::new(),
            })
            .collect(),
    )
    .unwrap();
    let built = wallet
        .propose_constitution(&backend, &config(), constitution.clone(), 10)
        .await
        .unwrap();
    assert_eq!(built.transaction.outputs[0].ta.parse().constitution().unwrap(), constitution);
}

#[tokio::test]
async fn test_vote_and_reward() {
    let (backend, mut wallet) = setup().await;

    let vote = wallet.vote(&backend, &config(), TARGET, false, 1).await.unwrap();
    let script = &vote.transaction.outputs[0].ta;
    assert!(script.is().declined_vote());
    assert_eq!(script.parse().target_pkh().unwrap(), TARGET);
    assert_eq!(vote.transaction.outputs[0].pkh, TARGET);

    let reward = wallet.reward(&backend, &config(), TARGET, 3, 500).await.unwrap();
    let script = &reward.transaction.outputs[0].ta;
    assert_eq!(reward.transaction.outputs[0].k, ScriptKind::Reward);
    assert_eq!(script.parse().redistribution_vout().unwrap(), 3);
}

#[tokio::test]
async fn test_record_restores_locked_wallet() {
    let (backend, wallet) = setup().await;
    let json = wallet.to_json().unwrap();

    let mut restored = Wallet::from_json(&json).unwrap();
    assert!(!restored.is_unlocked());
    assert_eq!(restored.balance(), wallet.balance());
    assert_eq!(restored.address().unwrap(), wallet.address().unwrap());
    assert!(matches!(restored.unlock("nope"), Err(WalletError::WrongPassword)));

    restored.unlock("pw").unwrap();
    assert!(restored.send(&backend, &config(), TARGET, 1_000).await.is_ok());
}

#[tokio::test]
async fn test_reset_clears_chain_view() {
    let (_backend, mut wallet) = setup().await;
    wallet
        .reset(
            "legal winner thank year wave sausage worth useful legal winner thank yellow",
            "new",
            &config(),
        )
        .unwrap();
    assert!(wallet.utxos().is_empty());
    assert!(!wallet.is_unlocked());
    assert!(matches!(wallet.set(MNEMONIC, "pw", &config()), Err(WalletError::AlreadySet)));
}
