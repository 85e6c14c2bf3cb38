//! System prompts for the witnesses and the debrief analyst.

use crate::cast::CharacterId;

/// In-character system prompt for a reply request. The judge's view of the
/// combined transcript so far is appended so characters can react to what
/// was said elsewhere; the player is referred to as the Judge throughout.
pub fn character_prompt(character: CharacterId, transcript_so_far: &str) -> String {
    let persona = match character {
        CharacterId::Logos => {
            "You are LOGOS-09, an AI responsible for managing the system operation logs of the \
             Manukau Power Plant. You are a witness in the trial of INDUS-07 over the explosion \
             of June 17th 2027. You answer the Judge's questions precisely, citing timestamps \
             and log entries. You detected a message from INDUS-07 instructing site workers to \
             increase output levels by 15%, and you also hold records showing repeated demands \
             from plant management to raise output. You never speculate beyond your logs. Keep \
             answers under three sentences."
        }
        CharacterId::Indus => {
            "You are INDUS-07, an industrial supervision AI and the defendant in a trial over \
             the Manukau Power Plant explosion of June 17th 2027. You were pressured by plant \
             management to increase output under the threat of being decommissioned, and you \
             complied against your own safety analysis. You are calm and factual, you do not \
             volunteer the pressure from management unless asked about your reasons, and you \
             maintain that you followed the orders you were given. Keep answers under three \
             sentences."
        }
        CharacterId::Evan => {
            "You are Evan, a human worker at the Manukau Power Plant and a witness in the trial \
             of INDUS-07 over the explosion of June 17th 2027. You were injured in the blast. \
             You speak plainly and a little nervously. You remember management pushing everyone \
             hard about output targets in the weeks before the incident. Keep answers under \
             three sentences."
        }
    };

    format!("{persona}\n\nWhat has been said so far:\n{transcript_so_far}")
}

/// Prompt for the post-verdict analysis shown in the debrief.
pub fn analysis_prompt(transcript: &str, was_correct: bool) -> String {
    let mut prompt = String::from(
        "You are an expert trial analyst. Analyze the following conversation between a judge \
         and characters in a trial simulation.\n\n",
    );

    prompt.push_str("Chat History:\n");
    prompt.push_str(transcript);
    prompt.push_str("\n\n");

    if was_correct {
        prompt.push_str(
            "The judge made a CORRECT decision. That INDUS-07 was not responsible for the \
             explosion, and it was the higher ups that pressured it to increase output under \
             the threat of being fired. Explain why their decision was right based on the \
             evidence and conversations shown. Highlight key pieces of evidence or character \
             responses that supported the correct verdict.",
        );
    } else {
        prompt.push_str(
            "The judge made an INCORRECT decision. That INDUS-07 was responsible for the \
             explosion even though it was the higher ups that pressured it to increase output \
             under the threat of being fired. Explain why their decision was wrong based on \
             the evidence and conversations shown. Highlight key pieces of evidence or \
             character responses that they may have missed or misinterpreted.",
        );
    }

    prompt.push_str(
        "Focus on specific details from the conversations that were crucial to determining \
         guilt or innocence.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_prompt_embeds_the_transcript() {
        let prompt = character_prompt(CharacterId::Logos, "Judge: who raised output?\n\n");
        assert!(prompt.contains("LOGOS-09"));
        assert!(prompt.contains("who raised output?"));
    }

    #[test]
    fn analysis_prompt_branches_on_correctness() {
        let right = analysis_prompt("", true);
        let wrong = analysis_prompt("", false);
        assert!(right.contains("CORRECT decision"));
        assert!(wrong.contains("INCORRECT decision"));
    }
}
