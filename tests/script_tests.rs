//! Script engine tests through the public API

use lugh_wallet::category::CostCategory;
use lugh_wallet::constitution::{Constitution, Rule};
use lugh_wallet::*;
use proptest::prelude::*;

fn constitution() -> Constitution {
    Constitution::new(
        (0..CONSTITUTION_RULE_COUNT)
            .map(|i| Rule {
                title: format!("Article {}", i + 1),
                content: "Content authors are paid from rewards".to_string(),
            })
            .collect(),
    )
    .unwrap()
}

fn top_level_matches(script: &Script) -> usize {
    let is = script.is();
    [is.proposal(), is.any_thread(), is.reward(), is.vote()]
        .iter()
        .filter(|m| **m)
        .count()
}

#[test]
fn test_lock_script_for_aa_pkh() {
    let pkh = [0xaa; 20];
    let mut builder = Script::build(ScriptKind::Empty);
    builder.append().lock_script(&pkh).unwrap();
    let script = builder.finish();

    assert_eq!(script.len(), 5);
    assert_eq!(script.elements()[0], vec![OP_DUP]);
    assert_eq!(script.elements()[1], vec![OP_HASH160]);
    assert_eq!(script.elements()[2], pkh.to_vec());
    assert_eq!(script.elements()[3], vec![OP_EQUALVERIFY]);
    assert_eq!(script.elements()[4], vec![OP_CHECKSIG]);
    assert!(script.is().lock_script());

    let truncated = Script::from_elements(script.elements()[..4].to_vec()).unwrap();
    assert!(!truncated.is().lock_script());
    assert!(matches!(
        truncated.parse().pkh_from_lock_script(),
        Err(WalletError::NotAVariant(_))
    ));
}

#[test]
fn test_cost_proposal_with_unchanged_thread_price() {
    let mut builder = Script::build(ScriptKind::Proposal);
    builder.append().cost_proposal(12, &[0x01; 20], 0, 5_000_000).unwrap();
    let script = builder.finish();

    // nonce, pkh, one (cost, sub-category) pair, COSTS, PROPOSAL, CONTENT
    assert_eq!(script.len(), 7);
    assert_eq!(script.elements()[2], 5_000_000i64.to_be_bytes().to_vec());
    assert_eq!(script.elements()[3], vec![CostCategory::ProposalPrice.as_byte()]);
    assert!(script.is().cost_proposal());
    assert_eq!(
        script.parse().proposal_costs().unwrap(),
        ProposalCosts {
            thread: -1,
            proposal: 5_000_000
        }
    );
}

#[test]
fn test_content_scripts_end_with_content_opcode() {
    let scripts = [
        ScriptVariant::Thread { nonce: 1, pkh: [2; 20] },
        ScriptVariant::ConstitutionProposal {
            nonce: 2,
            pkh: [2; 20],
            constitution: constitution(),
        },
        ScriptVariant::Reward {
            target: [3; 20],
            vout: 254,
        },
        ScriptVariant::Vote {
            target: [3; 20],
            accepted: false,
        },
    ];
    for variant in scripts {
        let script = variant.encode().unwrap();
        assert_eq!(script.elements().last(), Some(&vec![OP_CONTENT]));
        assert!(script.is().content());
        assert_eq!(top_level_matches(&script), 1);
    }
}

#[test]
fn test_parse_accessor_on_wrong_variant() {
    let vote = ScriptVariant::Vote {
        target: [3; 20],
        accepted: true,
    }
    .encode()
    .unwrap();
    assert!(matches!(vote.parse().content_nonce(), Err(WalletError::NotAVariant(_))));
    assert!(matches!(vote.parse().proposal_costs(), Err(WalletError::NotAVariant(_))));
    assert_eq!(vote.parse().target_pkh().unwrap(), [3; 20]);
    assert!(vote.parse().vote_accepted().unwrap());
}

#[test]
fn test_custom_unit_cost_ceiling() {
    let config = ScriptConfig { max_unit_cost: 1_000 };
    let mut builder = Script::build(ScriptKind::Proposal).with_config(&config);
    assert!(matches!(
        builder.append().cost_proposal(1, &[1; 20], 1_001, -1),
        Err(WalletError::InvalidScriptFormat(_))
    ));

    let script = ScriptVariant::CostProposal {
        nonce: 1,
        pkh: [1; 20],
        costs: ProposalCosts {
            thread: 5_000,
            proposal: UNCHANGED_COST,
        },
    }
    .encode()
    .unwrap();
    assert!(script.is().cost_proposal());
    assert!(!script.is_with(&config).cost_proposal());
}

#[test]
fn test_script_wire_round_trip() {
    let script = ScriptVariant::Rethread {
        nonce: 77,
        pkh: [4; 20],
        target: [5; 20],
    }
    .encode()
    .unwrap();
    let bytes = script.to_bytes();
    assert_eq!(bytes.len(), script.serialized_len());
    assert_eq!(Script::from_bytes(&bytes).unwrap(), script);
    assert!(Script::from_bytes(&bytes[..bytes.len() - 1]).is_none());
}

proptest! {
    #[test]
    fn prop_thread_round_trip(nonce in any::<u32>(), pkh in any::<[u8; 20]>()) {
        let variant = ScriptVariant::Thread { nonce, pkh };
        let script = variant.encode().unwrap();
        prop_assert!(script.is().thread());
        prop_assert_eq!(script.parse().variant().unwrap(), variant);
    }

    #[test]
    fn prop_cost_proposal_round_trip(
        nonce in any::<u32>(),
        thread in prop_oneof![Just(UNCHANGED_COST), 1i64..=DEFAULT_MAX_UNIT_COST],
        proposal in prop_oneof![Just(UNCHANGED_COST), 1i64..=DEFAULT_MAX_UNIT_COST],
    ) {
        let costs = ProposalCosts { thread, proposal };
        let variant = ScriptVariant::CostProposal { nonce, pkh: [9; 20], costs };
        let script = variant.encode().unwrap();
        prop_assert_eq!(script.parse().proposal_costs().unwrap(), costs);
    }

    #[test]
    fn prop_at_most_one_kind(elements in proptest::collection::vec(
        proptest::collection::vec(any::<u8>(), 0..24),
        0..10,
    )) {
        let script = Script::from_elements(elements).unwrap();
        prop_assert!(top_level_matches(&script) <= 1);
        if top_level_matches(&script) == 0 {
            prop_assert_eq!(script.kind(), ScriptKind::Empty);
        }
    }
}
