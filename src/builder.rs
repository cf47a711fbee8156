//! Transaction builder
//!
//! Turns output requests into a signed transaction:
//!
//! 1. validate the requests
//! 2. select melted UTXOs across wallets in priority order
//! 3. apportion the selected value over the requested outputs, the fee and
//!    the change
//! 4. repeat 2-3 with a never decreasing fee until it equals
//!    `fee_size * fee_per_byte`, the size of the signed transaction
//! 5. sign every input with the owning wallet's master key
//!
//! Output values and the change are melted (spendable) amounts. Each input's
//! face value is split across the sinks it feeds and recorded in the plan's
//! [`Contribution`]s, so the face value of an input is always fully
//! accounted for.

use crate::backend::ChainBackend;
use crate::category::ScriptKind;
use crate::config::WalletConfig;
use crate::constants::*;
use crate::error::{BackendStep, Result, WalletError};
use crate::melting::{required_list, utxo_ratio, MeltRatio};
use crate::script::Script;
use crate::transaction::sign_input;
use crate::types::*;
use crate::wallet::Wallet;
use chrono::Utc;
use std::cmp::Ordering;
use tracing::{debug, info};

/// One requested output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRequest {
    pub to: Pkh,
    /// Melted value to deliver
    pub amount: u64,
    pub kind: ScriptKind,
    pub script: Script,
}

impl OutputRequest {
    /// Plain value transfer
    pub fn payment(to: Pkh, amount: u64) -> Self {
        Self {
            to,
            amount,
            kind: ScriptKind::Empty,
            script: Script::new(),
        }
    }

    pub fn content(to: Pkh, amount: u64, kind: ScriptKind, script: Script) -> Self {
        Self {
            to,
            amount,
            kind,
            script,
        }
    }

    /// Zip the four parallel request arrays; each length is checked
    /// against `to` on its own
    pub fn from_parallel(to: &[Pkh], amounts: &[u64], kinds: &[ScriptKind], ta: &[Script]) -> Result<Vec<Self>> {
        let lengths = [("amounts", amounts.len()), ("kinds", kinds.len()), ("scripts", ta.len())];
        for (name, len) in lengths {
            if len != to.len() {
                return Err(WalletError::StructureMismatch(format!(
                    "{} has {} entries for {} recipients",
                    name,
                    len,
                    to.len()
                )));
            }
        }
        Ok(to
            .iter()
            .zip(amounts)
            .zip(kinds)
            .zip(ta)
            .map(|(((to, amount), kind), script)| Self::content(*to, *amount, *kind, script.clone()))
            .collect())
    }
}

/// A UTXO picked for spending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedUtxo {
    /// Index of the owning wallet in the builder's wallet list
    pub wallet: usize,
    pub utxo: Utxo,
    pub ratio: MeltRatio,
    pub melted: u64,
}

/// Where a slice of input value goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Output(usize),
    Fee,
    Change,
}

/// Part of one input spent on one sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub input: usize,
    pub sink: Sink,
    pub melted: u64,
    /// Face value of the input consumed by `melted`
    pub face: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apportionment {
    /// Requested outputs in request order, then the change output if any
    pub outputs: Vec<Output>,
    pub contributions: Vec<Contribution>,
    pub change: u64,
}

/// Converged, unsigned transaction layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub selected: Vec<SelectedUtxo>,
    pub outputs: Vec<Output>,
    pub contributions: Vec<Contribution>,
    pub fee: u64,
    pub change: u64,
    /// Fee attempts needed to converge
    pub attempts: usize,
}

impl Plan {
    fn unsigned_inputs(&self) -> Vec<Input> {
        self.selected
            .iter()
            .map(|s| Input {
                prev_transaction_hash: Some(s.utxo.tx_id),
                vout: s.utxo.vout,
                script_sig: Script::new(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction {
    pub transaction: Transaction,
    pub fee: u64,
    pub plan: Plan,
}

/// Walk wallets in order, taking from each the shortest UTXO prefix that
/// covers what is still missing
pub fn select_utxos(wallets: &[Wallet], amount: u64) -> Result<Vec<SelectedUtxo>> {
    let mut selected = Vec::new();
    let mut missing = amount;

    for (index, wallet) in wallets.iter().enumerate() {
        if missing == 0 {
            break;
        }
        let cch_list = wallet.cch_list();
        let chosen: Vec<&Utxo> = match required_list(wallet.utxos(), missing, cch_list) {
            Some(prefix) => prefix,
            None => wallet.utxos().iter().collect(),
        };
        for utxo in chosen {
            let ratio = utxo_ratio(utxo, cch_list);
            let melted = ratio.apply(utxo.value());
            if melted == 0 {
                continue;
            }
            missing = missing.saturating_sub(melted);
            selected.push(SelectedUtxo {
                wallet: index,
                utxo: utxo.clone(),
                ratio,
                melted,
            });
        }
    }

    if missing > 0 {
        return Err(WalletError::InsufficientFunds {
            required: amount,
            available: amount - missing,
        });
    }
    debug!(
        amount,
        inputs = selected.len(),
        wallets = wallets.len(),
        "selected UTXOs"
    );
    Ok(selected)
}

struct Cursor<'a> {
    selected: &'a [SelectedUtxo],
    pos: usize,
    melted_left: u64,
    face_left: u64,
}

impl<'a> Cursor<'a> {
    fn new(selected: &'a [SelectedUtxo]) -> Self {
        let mut cursor = Self {
            selected,
            pos: 0,
            melted_left: 0,
            face_left: 0,
        };
        cursor.load();
        cursor
    }

    fn load(&mut self) {
        if let Some(current) = self.selected.get(self.pos) {
            self.melted_left = current.melted;
            self.face_left = current.utxo.value();
        }
    }

    fn advance(&mut self) -> bool {
        if self.pos >= self.selected.len() {
            return false;
        }
        self.pos += 1;
        self.load();
        self.pos < self.selected.len()
    }

    /// Take up to `amount` melted value from the current input
    fn take(&mut self, amount: u64) -> (u64, u64) {
        let melted = amount.min(self.melted_left);
        let face = if melted == self.melted_left {
            self.face_left
        } else {
            self.selected[self.pos]
                .ratio
                .face_value_for(melted)
                .unwrap_or(self.face_left)
                .min(self.face_left)
        };
        self.melted_left -= melted;
        self.face_left -= face;
        (melted, face)
    }
}

/// Split the selected inputs over the requests, the fee and the change, in
/// that order. Consecutive inputs feeding one request become a single output
/// listing all of them.
pub fn apportion(
    selected: &[SelectedUtxo],
    requests: &[OutputRequest],
    fee: u64,
    change_to: Pkh,
) -> Result<Apportionment> {
    let available: u64 = selected.iter().map(|s| s.melted).sum();
    let required = requests
        .iter()
        .try_fold(fee, |acc, r| acc.checked_add(r.amount))
        .ok_or_else(|| WalletError::StructureMismatch("requested amounts overflow".to_string()))?;
    if available < required {
        return Err(WalletError::InsufficientFunds { required, available });
    }

    let mut cursor = Cursor::new(selected);
    let mut outputs = Vec::with_capacity(requests.len() + 1);
    let mut contributions = Vec::new();

    let sinks = requests
        .iter()
        .enumerate()
        .map(|(index, r)| (Sink::Output(index), r.amount))
        .chain(std::iter::once((Sink::Fee, fee)));

    for (sink, amount) in sinks {
        let mut need = amount;
        let mut sources: Vec<u8> = Vec::new();
        while need > 0 {
            if cursor.melted_left == 0 {
                if !cursor.advance() {
                    return Err(WalletError::InsufficientFunds { required, available });
                }
                continue;
            }
            let (melted, face) = cursor.take(need);
            need -= melted;
            if sources.last() != Some(&(cursor.pos as u8)) {
                sources.push(cursor.pos as u8);
            }
            contributions.push(Contribution {
                input: cursor.pos,
                sink,
                melted,
                face,
            });
        }

        if let Sink::Output(index) = sink {
            if sources.is_empty() && cursor.pos < selected.len() {
                sources.push(cursor.pos as u8);
            }
            let request = &requests[index];
            outputs.push(Output {
                value: amount,
                pkh: request.to,
                input_src: sources,
                ta: request.script.clone(),
                k: request.kind,
            });
        }
    }

    let change = available - required;
    if change > 0 {
        let mut sources = Vec::new();
        loop {
            if cursor.melted_left > 0 || cursor.face_left > 0 {
                let melted = cursor.melted_left;
                let (_, face) = cursor.take(melted);
                sources.push(cursor.pos as u8);
                contributions.push(Contribution {
                    input: cursor.pos,
                    sink: Sink::Change,
                    melted,
                    face,
                });
            }
            if !cursor.advance() {
                break;
            }
        }
        outputs.push(Output {
            value: change,
            pkh: change_to,
            input_src: sources,
            ta: Script::new(),
            k: ScriptKind::Empty,
        });
    }

    Ok(Apportionment {
        outputs,
        contributions,
        change,
    })
}

fn validate(wallets: &[Wallet], requests: &[OutputRequest], config: &WalletConfig) -> Result<u64> {
    if wallets.is_empty() {
        return Err(WalletError::StructureMismatch("no wallet to spend from".to_string()));
    }
    if requests.is_empty() {
        return Err(WalletError::StructureMismatch("no output requested".to_string()));
    }
    if requests.len() > MAX_TX_OUTPUT {
        return Err(WalletError::TransactionLimit(format!(
            "{} outputs requested, at most {} allowed",
            requests.len(),
            MAX_TX_OUTPUT
        )));
    }
    for (index, request) in requests.iter().enumerate() {
        let kind = request.script.is_with(&config.script).kind();
        if kind != request.kind {
            return Err(WalletError::StructureMismatch(format!(
                "output {} declares kind {:?} but its script is {:?}",
                index, request.kind, kind
            )));
        }
    }
    let total = requests
        .iter()
        .try_fold(0u64, |acc, r| acc.checked_add(r.amount))
        .ok_or_else(|| WalletError::StructureMismatch("requested amounts overflow".to_string()))?;
    if total == 0 {
        return Err(WalletError::StructureMismatch("total requested amount is zero".to_string()));
    }
    if wallets[0].cch_list().is_empty() {
        return Err(WalletError::MissingCycleState);
    }
    Ok(total)
}

/// Select, apportion and recompute the fee until it settles.
///
/// The fee never goes down between attempts. When a higher fee swallows the
/// change output and the smaller layout would need less, the plan instead
/// keeps the fee and demands at least one unit of change, which pulls in the
/// next UTXO.
pub fn plan_transaction(wallets: &[Wallet], requests: &[OutputRequest], config: &WalletConfig) -> Result<Plan> {
    let total = validate(wallets, requests, config)?;
    let change_to = wallets[0].pkh()?;
    let fee_per_byte = wallets[0].info().fee_per_byte;
    let utxo_count: usize = wallets.iter().map(|w| w.utxos().len()).sum();
    let max_attempts = (utxo_count + 2).max(config.max_fee_iterations);

    let mut fee = 0u64;
    let mut min_change = 0u64;
    for attempt in 1..=max_attempts {
        let target = total.saturating_add(fee).saturating_add(min_change);
        let selected = select_utxos(wallets, target)?;
        if selected.len() > MAX_TX_INPUT {
            return Err(WalletError::TransactionLimit(format!(
                "{} inputs needed, at most {} allowed",
                selected.len(),
                MAX_TX_INPUT
            )));
        }

        let apportionment = apportion(&selected, requests, fee, change_to)?;
        if apportionment.outputs.len() > MAX_TX_OUTPUT {
            return Err(WalletError::TransactionLimit(format!(
                "{} outputs with change, at most {} allowed",
                apportionment.outputs.len(),
                MAX_TX_OUTPUT
            )));
        }

        let plan = Plan {
            selected,
            outputs: apportionment.outputs,
            contributions: apportionment.contributions,
            fee,
            change: apportionment.change,
            attempts: attempt,
        };
        let draft = Transaction::new(0, 0, plan.unsigned_inputs(), plan.outputs.clone());
        let needed = (draft.fee_size() as u64).saturating_mul(fee_per_byte);
        debug!(
            attempt,
            fee,
            needed,
            inputs = plan.selected.len(),
            change = plan.change,
            "fee attempt"
        );

        match needed.cmp(&fee) {
            Ordering::Equal => return Ok(plan),
            Ordering::Greater => fee = needed,
            // the change output vanished at this fee
            Ordering::Less if plan.change == 0 && min_change == 0 => min_change = 1,
            Ordering::Less => return Err(WalletError::FeeConvergence(attempt)),
        }
    }

    Err(WalletError::FeeConvergence(max_attempts))
}

/// Build and sign a transaction spending from `wallets` in priority order.
/// The first wallet anchors the cycle height and receives the change.
pub async fn build_transaction<B: ChainBackend + ?Sized>(
    wallets: &mut [Wallet],
    requests: &[OutputRequest],
    backend: &B,
    config: &WalletConfig,
) -> Result<BuiltTransaction> {
    let plan = plan_transaction(wallets, requests, config)?;

    for selected in &plan.selected {
        if !wallets[selected.wallet].is_unlocked() {
            return Err(WalletError::LockedWallet);
        }
    }

    for selected in &plan.selected {
        let utxo = &selected.utxo;
        let prev = backend
            .fetch_transaction(&utxo.tx_id)
            .await
            .map_err(|e| WalletError::backend(BackendStep::PrevTxFetch, e))?
            .ok_or_else(|| {
                WalletError::UnresolvedUtxo(format!("transaction {} not found", hex::encode(utxo.tx_id)))
            })?;
        let output = prev.outputs.get(utxo.vout as usize).ok_or_else(|| {
            WalletError::UnresolvedUtxo(format!(
                "transaction {} has no output {}",
                hex::encode(utxo.tx_id),
                utxo.vout
            ))
        })?;
        if output.pkh != wallets[selected.wallet].pkh()? {
            return Err(WalletError::UnresolvedUtxo(format!(
                "output {}:{} is not owned by the signing wallet",
                hex::encode(utxo.tx_id),
                utxo.vout
            )));
        }
    }

    let lh = wallets[0].info().lugh_height;
    let mut transaction = Transaction::new(lh, Utc::now().timestamp(), plan.unsigned_inputs(), plan.outputs.clone());
    for (index, selected) in plan.selected.iter().enumerate() {
        sign_input(&mut transaction, index, wallets[selected.wallet].keys())?;
        debug!(input = index, "signed input");
    }

    info!(
        inputs = transaction.inputs.len(),
        outputs = transaction.outputs.len(),
        fee = plan.fee,
        attempts = plan.attempts,
        "built transaction"
    );
    Ok(BuiltTransaction {
        transaction,
        fee: plan.fee,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KdfParams;
    use crate::keys::KeyStore;
    use crate::wallet::WalletState;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const CCH: Hash = [9; 32];

    fn utxo(seed: u8, value: u64, mr: u64) -> Utxo {
        Utxo {
            tx_id: [seed; 32],
            vout: 0,
            output: Output {
                value,
                pkh: [0; 20],
                input_src: vec![],
                ta: Script::new(),
                k: ScriptKind::Empty,
            },
            mr,
            cch: CCH,
        }
    }

    fn wallet(utxos: Vec<Utxo>, fee_per_byte: u64) -> Wallet {
        let mut keys = KeyStore::new();
        let kdf = KdfParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };
        keys.set(MNEMONIC, "pw", &kdf).unwrap();
        Wallet::from_parts(
            keys,
            WalletState {
                utxos,
                cch_list: vec![CCH],
                info: WalletInfo {
                    fee_per_byte,
                    ..WalletInfo::default()
                },
                content_nonce: 0,
            },
        )
    }

    fn selected(values: &[(u64, u64)]) -> Vec<SelectedUtxo> {
        values
            .iter()
            .enumerate()
            .map(|(i, (value, mr))| {
                let utxo = utxo(i as u8, *value, *mr);
                let ratio = utxo_ratio(&utxo, &[CCH]);
                SelectedUtxo {
                    wallet: 0,
                    melted: ratio.apply(*value),
                    ratio,
                    utxo,
                }
            })
            .collect()
    }

    #[test]
    fn test_from_parallel_checks_each_length() {
        let to = [[1; 20], [2; 20]];
        let scripts = [Script::new(), Script::new()];
        let kinds = [ScriptKind::Empty, ScriptKind::Empty];
        assert!(OutputRequest::from_parallel(&to, &[1, 2], &kinds, &scripts).is_ok());
        assert!(matches!(
            OutputRequest::from_parallel(&to, &[1, 2], &kinds[..1], &scripts),
            Err(WalletError::StructureMismatch(_))
        ));
        assert!(matches!(
            OutputRequest::from_parallel(&to, &[1, 2], &kinds, &scripts[..1]),
            Err(WalletError::StructureMismatch(_))
        ));
        assert!(matches!(
            OutputRequest::from_parallel(&to, &[1], &kinds, &scripts),
            Err(WalletError::StructureMismatch(_))
        ));
    }

    #[test]
    fn test_select_across_wallets() {
        let first = wallet(vec![utxo(1, 50, MR_SCALE)], 0);
        let second = wallet(vec![utxo(2, 30, MR_SCALE), utxo(3, 30, MR_SCALE)], 0);
        let wallets = [first, second];

        let picked = select_utxos(&wallets, 70).unwrap();
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].wallet, 0);
        assert_eq!(picked[1].wallet, 1);

        match select_utxos(&wallets, 200) {
            Err(WalletError::InsufficientFunds { required, available }) => {
                assert_eq!(required, 200);
                assert_eq!(available, 110);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_apportion_merges_and_returns_change() {
        let inputs = selected(&[(30, MR_SCALE), (30, MR_SCALE), (30, MR_SCALE)]);
        let requests = [OutputRequest::payment([5; 20], 50), OutputRequest::payment([6; 20], 20)];

        let result = apportion(&inputs, &requests, 5, [7; 20]).unwrap();
        assert_eq!(result.outputs.len(), 3);
        assert_eq!(result.outputs[0].value, 50);
        assert_eq!(result.outputs[0].input_src, vec![0, 1]);
        assert_eq!(result.outputs[1].input_src, vec![1, 2]);
        assert_eq!(result.change, 15);
        assert_eq!(result.outputs[2].pkh, [7; 20]);
        assert_eq!(result.outputs[2].k, ScriptKind::Empty);
        assert_eq!(result.outputs[2].input_src, vec![2]);

        let fee_melted: u64 = result
            .contributions
            .iter()
            .filter(|c| c.sink == Sink::Fee)
            .map(|c| c.melted)
            .sum();
        assert_eq!(fee_melted, 5);
    }

    #[test]
    fn test_apportion_accounts_for_face_value() {
        // half melted: 1000 face is worth 500
        let inputs = selected(&[(1_000, MR_SCALE / 2), (1_000, MR_SCALE / 2)]);
        let requests = [OutputRequest::payment([5; 20], 700)];

        let result = apportion(&inputs, &requests, 0, [7; 20]).unwrap();
        assert_eq!(result.change, 300);
        for (index, input) in inputs.iter().enumerate() {
            let face: u64 = result
                .contributions
                .iter()
                .filter(|c| c.input == index)
                .map(|c| c.face)
                .sum();
            assert_eq!(face, input.utxo.value());
        }
        let first_output_face: u64 = result
            .contributions
            .iter()
            .filter(|c| c.sink == Sink::Output(0))
            .map(|c| c.face)
            .sum();
        assert_eq!(first_output_face, 1_400);
    }

    #[test]
    fn test_apportion_exact_amount_has_no_change() {
        let inputs = selected(&[(40, MR_SCALE)]);
        let result = apportion(&inputs, &[OutputRequest::payment([5; 20], 40)], 0, [7; 20]).unwrap();
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.change, 0);
    }

    #[test]
    fn test_zero_amount_output_references_current_input() {
        let inputs = selected(&[(40, MR_SCALE)]);
        let requests = [OutputRequest::payment([5; 20], 10), OutputRequest::payment([6; 20], 0)];
        let result = apportion(&inputs, &requests, 0, [7; 20]).unwrap();
        assert_eq!(result.outputs[1].value, 0);
        assert_eq!(result.outputs[1].input_src, vec![0]);
    }

    #[test]
    fn test_plan_fee_matches_size() {
        let wallets = [wallet(vec![utxo(1, 100_000, MR_SCALE), utxo(2, 100_000, MR_SCALE)], 3)];
        let plan = plan_transaction(&wallets, &[OutputRequest::payment([5; 20], 150_000)], &WalletConfig::default())
            .unwrap();
        let draft = Transaction::new(0, 0, plan.unsigned_inputs(), plan.outputs.clone());
        assert_eq!(plan.fee, draft.fee_size() as u64 * 3);
        assert_eq!(plan.change, 200_000 - 150_000 - plan.fee);
        assert!(plan.attempts <= 4);
    }

    /// Fee of a one-input payment that also returns change
    fn single_input_fee_with_change(fee_per_byte: u64) -> u64 {
        let input = Input {
            prev_transaction_hash: Some([0; 32]),
            vout: 0,
            script_sig: Script::new(),
        };
        let output = Output {
            value: 0,
            pkh: [0; 20],
            input_src: vec![0],
            ta: Script::new(),
            k: ScriptKind::Empty,
        };
        let draft = Transaction::new(0, 0, vec![input], vec![output.clone(), output]);
        draft.fee_size() as u64 * fee_per_byte
    }

    #[test]
    fn test_fee_swallowing_change_pulls_next_utxo() {
        // the first UTXO covers the payment plus a fee that assumes change,
        // leaving no change at that fee
        let edge = single_input_fee_with_change(1);
        let wallets = [wallet(vec![utxo(1, 10_000 + edge, MR_SCALE), utxo(2, 100_000, MR_SCALE)], 1)];
        let plan = plan_transaction(&wallets, &[OutputRequest::payment([5; 20], 10_000)], &WalletConfig::default())
            .unwrap();

        let draft = Transaction::new(0, 0, plan.unsigned_inputs(), plan.outputs.clone());
        assert_eq!(plan.selected.len(), 2);
        assert_eq!(plan.fee, draft.fee_size() as u64);
        assert!(plan.fee > edge);
        assert_eq!(plan.change, 110_000 + edge - 10_000 - plan.fee);
        assert_eq!(plan.outputs.len(), 2);
        assert!(plan.attempts <= 4);
    }

    #[test]
    fn test_fee_never_decreases_into_short_funds() {
        // same edge with nothing left to pull in
        let edge = single_input_fee_with_change(1);
        let wallets = [wallet(vec![utxo(1, 10_000 + edge, MR_SCALE)], 1)];
        assert!(matches!(
            plan_transaction(&wallets, &[OutputRequest::payment([5; 20], 10_000)], &WalletConfig::default()),
            Err(WalletError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_plan_without_fee_rate() {
        let wallets = [wallet(vec![utxo(1, 10, MR_SCALE)], 0)];
        let plan = plan_transaction(&wallets, &[OutputRequest::payment([5; 20], 10)], &WalletConfig::default())
            .unwrap();
        assert_eq!(plan.fee, 0);
        assert_eq!(plan.attempts, 1);
    }

    #[test]
    fn test_fee_pushes_selection_short() {
        let wallets = [wallet(vec![utxo(1, 100, MR_SCALE)], 1)];
        assert!(matches!(
            plan_transaction(&wallets, &[OutputRequest::payment([5; 20], 100)], &WalletConfig::default()),
            Err(WalletError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_validation() {
        let wallets = [wallet(vec![utxo(1, 100, MR_SCALE)], 0)];
        let config = WalletConfig::default();
        assert!(matches!(
            plan_transaction(&wallets, &[], &config),
            Err(WalletError::StructureMismatch(_))
        ));
        assert!(matches!(
            plan_transaction(&wallets, &[OutputRequest::payment([5; 20], 0)], &config),
            Err(WalletError::StructureMismatch(_))
        ));
        let mismatched = OutputRequest {
            kind: ScriptKind::Thread,
            ..OutputRequest::payment([5; 20], 10)
        };
        assert!(matches!(
            plan_transaction(&wallets, &[mismatched], &config),
            Err(WalletError::StructureMismatch(_))
        ));
        let too_many = vec![OutputRequest::payment([5; 20], 1); MAX_TX_OUTPUT + 1];
        assert!(matches!(
            plan_transaction(&wallets, &too_many, &config),
            Err(WalletError::TransactionLimit(_))
        ));
    }

    #[test]
    fn test_missing_cycle_state() {
        let mut empty = wallet(vec![utxo(1, 100, MR_SCALE)], 0);
        empty.state_mut().cch_list.clear();
        assert!(matches!(
            plan_transaction(&[empty], &[OutputRequest::payment([5; 20], 10)], &WalletConfig::default()),
            Err(WalletError::MissingCycleState)
        ));
    }
}
