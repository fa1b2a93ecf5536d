use indoc::indoc;

pub const DEFAULT_STUFF_QA_TEMPLATE: &str = indoc! {"
    Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

    {context}

    Question: {question}
    Helpful Answer:"};

/// Chat models get the context as instructions and the bare question as the user turn.
pub const CHAT_STUFF_QA_TEMPLATE: &str = indoc! {"
    Use the following pieces of context to answer the users question.
    If you don't know the answer, just say that you don't know, don't try to make up an answer.
    ----------------
    {context}

    {question}"};
